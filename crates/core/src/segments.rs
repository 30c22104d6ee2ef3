//! Segment builders.
//!
//! [`SegmentBuilder`] renders one segment at a time from record values. It maps each record
//! field to a template slot, applies the field encoders, and attaches the segment name to any
//! failure so assemblers can report which segment could not be built.
//!
//! Sequence numbers are written exactly as passed. Callers choose whether a repeated group
//! counts from 0 or 1.

use crate::composites;
use crate::config::Hl7Config;
use crate::constants::{
    AL1, DG1, DIAGNOSTIC_SERV_ID_MDOC, EVN, HL7_VERSION, MRG, MSA, MSH, NK1, NTE, OBR, OBX, ORC,
    PD1, PID, PR1, PV1, PV2, TXA,
};
use crate::encoding::{
    escape_text, escape_unit, expand_identifier_list, format_date, format_instant, pack_repeated,
};
use crate::templates::{Bindings, TemplateId, TEMPLATES};
use crate::{Hl7Error, Hl7Result, MessageType, RenderCause};
use chrono::{DateTime, Utc};
use hl7_header::HeaderInfo;
use sim_record::{
    Allergy, AssociatedParty, CodedElement, DiagnosisOrProcedure, Doctor, Document, NullTime,
    Order, OrderResult, PatientInfo, Person, PrimaryFacility,
};

/// Wraps any failure of `build` with the name of the segment being built.
fn in_segment<T>(segment: &'static str, build: impl FnOnce() -> Hl7Result<T>) -> Hl7Result<T> {
    build().map_err(|source| Hl7Error::Segment {
        segment,
        source: Box::new(source),
    })
}

fn missing(template: TemplateId, what: &'static str) -> Hl7Error {
    Hl7Error::TemplateRender {
        template: template.name(),
        cause: RenderCause::MissingData(what),
    }
}

/// Builds single segments in the configured protocol time zone.
#[derive(Clone, Copy, Debug, Default)]
pub struct SegmentBuilder {
    config: Hl7Config,
}

impl SegmentBuilder {
    pub fn new(config: Hl7Config) -> Self {
        Self { config }
    }

    fn date(&self, value: &NullTime) -> Hl7Result<String> {
        format_date(value, self.config.timezone())
    }

    fn instant(&self, at: DateTime<Utc>) -> String {
        format_instant(at, self.config.timezone())
    }

    /// MSH: message header.
    pub fn build_msh(
        &self,
        msg_time: DateTime<Utc>,
        message_type: &MessageType,
        header: &HeaderInfo,
    ) -> Hl7Result<String> {
        in_segment(MSH, || {
            let bindings = Bindings::new()
                .with("sending_application", header.sending_application.as_str())
                .with("sending_facility", header.sending_facility.as_str())
                .with("receiving_application", header.receiving_application.as_str())
                .with("receiving_facility", header.receiving_facility.as_str())
                .with("date_time", self.instant(msg_time))
                .with("message_code", message_type.code())
                .with("trigger_event", message_type.trigger_event())
                .with("message_control_id", header.message_control_id.as_str())
                .with("version", HL7_VERSION);
            TEMPLATES.render(TemplateId::Msh, &bindings)
        })
    }

    /// MSA: acknowledges the order whose control id is given.
    pub fn build_msa(&self, original_control_id: &str) -> Hl7Result<String> {
        in_segment(MSA, || {
            let bindings = Bindings::new().with("original_control_id", original_control_id);
            TEMPLATES.render(TemplateId::Msa, &bindings)
        })
    }

    /// EVN: event type.
    ///
    /// `recorded` is when the event was recorded, `planned` when it is planned to happen and
    /// `occurred` when it actually happened. The last two are blank when invalid.
    pub fn build_evn(
        &self,
        recorded: DateTime<Utc>,
        message_type: &MessageType,
        planned: &NullTime,
        operator: Option<&Doctor>,
        occurred: &NullTime,
    ) -> Hl7Result<String> {
        in_segment(EVN, || {
            let bindings = Bindings::new()
                .with("trigger_event", message_type.trigger_event())
                .with("recorded", self.instant(recorded))
                .with("planned", self.date(planned)?)
                .with_optional("operator", composites::doctor(operator)?)
                .with("occurred", self.date(occurred)?);
            TEMPLATES.render(TemplateId::Evn, &bindings)
        })
    }

    /// PID: patient identification.
    pub fn build_pid(&self, person: &Person) -> Hl7Result<String> {
        in_segment(PID, || {
            let bindings = Bindings::new()
                .with("mrn", composites::mrn(&person.mrn)?)
                .with("nhs", person.nhs.as_str())
                .with("name", composites::person_name(person)?)
                .with("birth", self.date(&person.birth)?)
                .with("gender", person.gender.as_str())
                .with_optional("address", composites::address(person.address.as_ref())?)
                .with_optional("home_phone", composites::home_number(&person.phone_number)?)
                .with_optional(
                    "ethnicity",
                    composites::coded_element(person.ethnicity.as_ref())?,
                )
                .with("date_of_death", self.date(&person.date_of_death)?)
                .with("death_indicator", person.death_indicator.as_str());
            TEMPLATES.render(TemplateId::Pid, &bindings)
        })
    }

    /// PD1: additional demographics. Only the primary facility is populated.
    pub fn build_pd1(&self, primary_facility: Option<&PrimaryFacility>) -> Hl7Result<String> {
        in_segment(PD1, || {
            let bindings = Bindings::new().with_optional(
                "primary_facility",
                composites::primary_facility(primary_facility)?,
            );
            TEMPLATES.render(TemplateId::Pd1, &bindings)
        })
    }

    /// PV1: patient visit.
    pub fn build_pv1(&self, patient: &PatientInfo) -> Hl7Result<String> {
        in_segment(PV1, || {
            let bindings = Bindings::new()
                .with("class", patient.class.as_str())
                .with_optional("location", composites::location(patient.location.as_ref())?)
                .with_optional(
                    "prior_location",
                    composites::location(patient.prior_location.as_ref())?,
                )
                .with_optional(
                    "attending_doctor",
                    composites::doctor(patient.attending_doctor.as_ref())?,
                )
                .with("hospital_service", patient.hospital_service.as_str())
                .with_optional(
                    "temporary_location",
                    composites::location(patient.temporary_location.as_ref())?,
                )
                .with("patient_type", patient.patient_type.as_str())
                .with_optional("visit_id", composites::visit_id(patient.visit_id)?)
                .with("account_status", patient.account_status.as_str())
                .with_optional(
                    "pending_location",
                    composites::location(patient.pending_location.as_ref())?,
                )
                .with_optional(
                    "prior_temporary_location",
                    composites::location(patient.prior_temporary_location.as_ref())?,
                )
                .with("admission_date", self.date(&patient.admission_date)?)
                .with("discharge_date", self.date(&patient.discharge_date)?);
            TEMPLATES.render(TemplateId::Pv1, &bindings)
        })
    }

    /// A PV1 carrying no visit information, with patient class N (not applicable).
    ///
    /// Used by messages that must include a PV1 even though no visit is involved.
    pub fn build_pseudo_pv1(&self) -> Hl7Result<String> {
        in_segment(PV1, || TEMPLATES.render(TemplateId::PseudoPv1, &Bindings::new()))
    }

    /// PV2: additional visit information.
    pub fn build_pv2(&self, patient: &PatientInfo) -> Hl7Result<String> {
        in_segment(PV2, || {
            let bindings = Bindings::new()
                .with_optional(
                    "prior_pending_location",
                    composites::location(patient.prior_pending_location.as_ref())?,
                )
                .with_optional("admit_reason", composites::admit_reason(&patient.admit_reason)?)
                .with("expected_admit", self.date(&patient.expected_admit_date_time)?)
                .with(
                    "expected_discharge",
                    self.date(&patient.expected_discharge_date_time)?,
                );
            TEMPLATES.render(TemplateId::Pv2, &bindings)
        })
    }

    /// NK1: next of kin or other associated party.
    pub fn build_nk1(&self, set_id: usize, party: &AssociatedParty) -> Hl7Result<String> {
        in_segment(NK1, || {
            let person = &party.person;
            let bindings = Bindings::new()
                .with("set_id", set_id.to_string())
                .with("name", composites::person_name(person)?)
                .with_optional(
                    "relationship",
                    composites::coded_element(party.relationship.as_ref())?,
                )
                .with_optional("address", composites::address(person.address.as_ref())?)
                .with_optional("home_phone", composites::home_number(&person.phone_number)?)
                .with_optional(
                    "contact_role",
                    composites::coded_element(party.contact_role.as_ref())?,
                )
                .with("gender", person.gender.as_str());
            TEMPLATES.render(TemplateId::Nk1, &bindings)
        })
    }

    /// AL1: allergy. The description is always present.
    pub fn build_al1(&self, set_id: usize, allergy: &Allergy) -> Hl7Result<String> {
        in_segment(AL1, || {
            let bindings = Bindings::new()
                .with("set_id", set_id.to_string())
                .with("type", allergy.kind.as_str())
                .with_optional(
                    "description",
                    composites::coded_element(Some(&allergy.description))?,
                )
                .with("severity", allergy.severity.as_str())
                .with("reaction", allergy.reaction.as_str())
                .with("identified", self.date(&allergy.identification_date_time)?);
            TEMPLATES.render(TemplateId::Al1, &bindings)
        })
    }

    /// ORC: common order.
    pub fn build_orc(&self, order: &Order) -> Hl7Result<String> {
        in_segment(ORC, || {
            let bindings = Bindings::new()
                .with("order_control", order.order_control.as_str())
                .with("placer", order.placer.as_str())
                .with("filler", order.filler.as_str())
                .with("order_status", order.order_status.as_str())
                .with("order_date_time", self.date(&order.order_date_time)?);
            TEMPLATES.render(TemplateId::Orc, &bindings)
        })
    }

    /// OBR: observation request.
    ///
    /// Orders with diagnostic service id `MDOC` carry a clinical document. Their OBR-3 holds
    /// the document id of the first result's note instead of the filler order number.
    ///
    /// # Errors
    ///
    /// Fails with [`RenderCause::MissingData`] if an `MDOC` order has no result with a
    /// clinical note.
    pub fn build_obr(&self, order: &Order) -> Hl7Result<String> {
        in_segment(OBR, || {
            let (id, bindings) = if order.diagnostic_serv_id == DIAGNOSTIC_SERV_ID_MDOC {
                let note = order
                    .results
                    .first()
                    .and_then(|result| result.clinical_note.as_ref())
                    .ok_or_else(|| {
                        missing(TemplateId::ObrClinicalNote, "clinical note of the first result")
                    })?;
                (
                    TemplateId::ObrClinicalNote,
                    Bindings::new().with("document_id", note.document_id.as_str()),
                )
            } else {
                (
                    TemplateId::Obr,
                    Bindings::new().with("filler", order.filler.as_str()),
                )
            };

            let bindings = bindings
                .with("placer", order.placer.as_str())
                .with_optional(
                    "order_profile",
                    composites::coded_element(order.order_profile.as_ref())?,
                )
                .with("order_date_time", self.date(&order.order_date_time)?)
                .with("collected_date_time", self.date(&order.collected_date_time)?)
                .with(
                    "received_in_lab_date_time",
                    self.date(&order.received_in_lab_date_time)?,
                )
                .with("specimen_source", order.specimen_source.as_str())
                .with_optional(
                    "ordering_provider",
                    composites::doctor(order.ordering_provider.as_ref())?,
                )
                .with("reported_date_time", self.date(&order.reported_date_time)?)
                .with("diagnostic_serv_id", order.diagnostic_serv_id.as_str())
                .with("results_status", order.results_status.as_str());
            TEMPLATES.render(id, &bindings)
        })
    }

    /// OBX: one observation result.
    pub fn build_obx(&self, set_id: usize, result: &OrderResult) -> Hl7Result<String> {
        in_segment(OBX, || {
            let bindings = Bindings::new()
                .with("set_id", set_id.to_string())
                .with("value_type", result.value_type.as_str())
                .with_optional(
                    "test_name",
                    composites::coded_element(result.test_name.as_ref())?,
                )
                .with("value", pack_repeated(&result.value))
                .with("unit", escape_unit(&result.unit))
                .with("range", escape_text(&result.range))
                .with("abnormal_flag", result.abnormal_flag.as_str())
                .with("status", result.status.as_str())
                .with(
                    "observation_date_time",
                    self.date(&result.observation_date_time)?,
                );
            TEMPLATES.render(TemplateId::Obx, &bindings)
        })
    }

    /// OBX for one content item of a clinical note.
    ///
    /// # Errors
    ///
    /// Fails with [`RenderCause::MissingData`] if `result` has no clinical note or the note has
    /// no content at `content_index`.
    pub fn build_obx_for_clinical_note(
        &self,
        set_id: usize,
        content_index: usize,
        result: &OrderResult,
        order: &Order,
    ) -> Hl7Result<String> {
        in_segment(OBX, || {
            let note = result
                .clinical_note
                .as_ref()
                .ok_or_else(|| missing(TemplateId::ObxClinicalNote, "clinical note"))?;
            let content = note
                .contents
                .get(content_index)
                .ok_or_else(|| missing(TemplateId::ObxClinicalNote, "clinical note content"))?;

            let bindings = Bindings::new()
                .with("set_id", set_id.to_string())
                .with("value_type", result.value_type.as_str())
                .with("note_type", composites::coded_note(note)?)
                .with("note_value", composites::note_value(content)?)
                .with(
                    "observation_date_time",
                    self.date(&result.observation_date_time)?,
                )
                .with_optional(
                    "ordering_provider",
                    composites::doctor(order.ordering_provider.as_ref())?,
                );
            TEMPLATES.render(TemplateId::ObxClinicalNote, &bindings)
        })
    }

    /// OBX carrying one line of a document, as text.
    pub fn build_obx_for_mdm(
        &self,
        set_id: usize,
        observation_identifier: Option<&CodedElement>,
        line: &str,
    ) -> Hl7Result<String> {
        in_segment(OBX, || {
            let bindings = Bindings::new()
                .with("set_id", set_id.to_string())
                .with_optional(
                    "observation_identifier",
                    composites::coded_element(observation_identifier)?,
                )
                .with("content", line);
            TEMPLATES.render(TemplateId::ObxForMdm, &bindings)
        })
    }

    /// NTE: notes and comments.
    pub fn build_nte(&self, set_id: usize, note: &str) -> Hl7Result<String> {
        in_segment(NTE, || {
            let bindings = Bindings::new()
                .with("set_id", set_id.to_string())
                .with("note", note);
            TEMPLATES.render(TemplateId::Nte, &bindings)
        })
    }

    /// MRG: merge patient information, one repetition per prior MRN.
    pub fn build_mrg(&self, prior_mrns: &[String]) -> Hl7Result<String> {
        in_segment(MRG, || {
            let bindings =
                Bindings::new().with("prior_identifiers", expand_identifier_list(prior_mrns)?);
            TEMPLATES.render(TemplateId::Mrg, &bindings)
        })
    }

    /// DG1: diagnosis.
    pub fn build_dg1(&self, set_id: usize, diagnosis: &DiagnosisOrProcedure) -> Hl7Result<String> {
        in_segment(DG1, || self.diagnosis_or_procedure(TemplateId::Dg1, set_id, diagnosis))
    }

    /// PR1: procedure.
    pub fn build_pr1(&self, set_id: usize, procedure: &DiagnosisOrProcedure) -> Hl7Result<String> {
        in_segment(PR1, || self.diagnosis_or_procedure(TemplateId::Pr1, set_id, procedure))
    }

    fn diagnosis_or_procedure(
        &self,
        id: TemplateId,
        set_id: usize,
        entry: &DiagnosisOrProcedure,
    ) -> Hl7Result<String> {
        let description = entry
            .description
            .as_ref()
            .ok_or_else(|| missing(id, "description"))?;
        let bindings = Bindings::new()
            .with("set_id", set_id.to_string())
            .with_optional("description", composites::coded_element(Some(description))?)
            .with("description_text", description.text.as_str())
            .with("date_time", self.date(&entry.date_time)?)
            .with("type", entry.kind.as_str())
            .with_optional("clinician", composites::doctor(entry.clinician.as_ref())?);
        TEMPLATES.render(id, &bindings)
    }

    /// TXA: transcription document header. The author is the patient's attending doctor.
    pub fn build_txa(&self, patient: &PatientInfo, document: &Document) -> Hl7Result<String> {
        in_segment(TXA, || {
            let bindings = Bindings::new()
                .with("document_type", document.document_type.as_str())
                .with("activity_date_time", self.date(&document.activity_date_time)?)
                .with_optional(
                    "attending_doctor",
                    composites::doctor(patient.attending_doctor.as_ref())?,
                )
                .with("edit_date_time", self.date(&document.edit_date_time)?)
                .with(
                    "unique_document_number",
                    document.unique_document_number.as_str(),
                )
                .with(
                    "document_completion_status",
                    document.document_completion_status.as_str(),
                );
            TEMPLATES.render(TemplateId::Txa, &bindings)
        })
    }
}
