//! Message assemblers.
//!
//! Each assembler builds the segments of one message variant in a fixed order and joins them
//! with the segment terminator. If any segment fails, the whole message fails and no partial
//! text is returned.
//!
//! [`MessageBuilder::build`] selects the assembler from a [`MessageType`] at runtime.

use crate::constants::{ADT, DIAGNOSTIC_SERV_ID_MDOC, MDM, ORM, ORR, ORU, SEGMENT_TERMINATOR};
use crate::segments::SegmentBuilder;
use crate::{Hl7Config, Hl7Error, Hl7Result};
use chrono::{DateTime, Utc};
use hl7_header::HeaderInfo;
use serde::{Deserialize, Serialize};
use sim_record::{Document, NullTime, Order, PatientInfo};
use std::fmt;
use std::str::FromStr;

/// Every message variant [`MessageBuilder::build`] can produce, as `(code, trigger event)`.
pub const SUPPORTED_VARIANTS: &[(&str, &str)] = &[
    (ADT, "A01"),
    (ADT, "A02"),
    (ADT, "A03"),
    (ADT, "A04"),
    (ADT, "A05"),
    (ADT, "A08"),
    (ADT, "A09"),
    (ADT, "A10"),
    (ADT, "A11"),
    (ADT, "A12"),
    (ADT, "A13"),
    (ADT, "A14"),
    (ADT, "A15"),
    (ADT, "A16"),
    (ADT, "A17"),
    (ADT, "A23"),
    (ADT, "A25"),
    (ADT, "A26"),
    (ADT, "A27"),
    (ADT, "A28"),
    (ADT, "A31"),
    (ADT, "A34"),
    (ADT, "A40"),
    (MDM, "T02"),
    (ORM, "O01"),
    (ORR, "O02"),
    (ORU, "R01"),
    (ORU, "R03"),
    (ORU, "R32"),
];

// ============================================================================
// Message type
// ============================================================================

/// A message code and trigger event, such as `ADT^A01`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MessageType {
    code: String,
    trigger_event: String,
}

impl MessageType {
    pub fn new(code: impl Into<String>, trigger_event: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            trigger_event: trigger_event.into(),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn trigger_event(&self) -> &str {
        &self.trigger_event
    }

    /// Whether [`MessageBuilder::build`] has an assembler for this type.
    pub fn is_supported(&self) -> bool {
        SUPPORTED_VARIANTS
            .iter()
            .any(|(code, event)| *code == self.code && *event == self.trigger_event)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}^{}", self.code, self.trigger_event)
    }
}

impl FromStr for MessageType {
    type Err = Hl7Error;

    /// Parses `CODE^EVENT`. Both parts must be present and non-empty.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Hl7Error::InvalidInput(format!("message type must be CODE^EVENT, got '{s}'"));
        let (code, event) = s.trim().split_once('^').ok_or_else(invalid)?;
        if code.is_empty() || event.is_empty() || event.contains('^') {
            return Err(invalid());
        }
        Ok(Self::new(code, event))
    }
}

impl Serialize for MessageType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MessageType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Message
// ============================================================================

/// A complete message: its type and the segment text joined by `\r`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hl7Message {
    message_type: MessageType,
    text: String,
}

impl Hl7Message {
    pub fn message_type(&self) -> &MessageType {
        &self.message_type
    }

    /// The wire text, without a trailing terminator.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.text.split(SEGMENT_TERMINATOR)
    }
}

impl fmt::Display for Hl7Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "message:[type:{} msg:{}]",
            self.message_type,
            self.text.replace(SEGMENT_TERMINATOR, " ")
        )
    }
}

// ============================================================================
// Assemblers
// ============================================================================

/// Times carried by an EVN segment.
#[derive(Clone, Copy, Debug)]
struct Event {
    recorded: DateTime<Utc>,
    planned: NullTime,
    occurred: NullTime,
}

impl Event {
    fn at(recorded: DateTime<Utc>) -> Self {
        Self {
            recorded,
            planned: NullTime::Invalid,
            occurred: NullTime::Invalid,
        }
    }

    fn planned(self, planned: NullTime) -> Self {
        Self { planned, ..self }
    }

    fn occurred(self, occurred: NullTime) -> Self {
        Self { occurred, ..self }
    }
}

/// Builds complete messages.
#[derive(Clone, Copy, Debug, Default)]
pub struct MessageBuilder {
    segments: SegmentBuilder,
}

impl MessageBuilder {
    pub fn new(config: Hl7Config) -> Self {
        Self {
            segments: SegmentBuilder::new(config),
        }
    }

    fn finish(
        &self,
        message_type: MessageType,
        header: &HeaderInfo,
        segments: Vec<String>,
    ) -> Hl7Message {
        tracing::debug!(
            message_type = %message_type,
            control_id = %header.message_control_id,
            segments = segments.len(),
            "built message"
        );
        Hl7Message {
            message_type,
            text: segments.join(SEGMENT_TERMINATOR),
        }
    }

    /// MSH, EVN and PID, the start of every ADT message.
    fn adt_head(
        &self,
        message_type: &MessageType,
        header: &HeaderInfo,
        patient: &PatientInfo,
        event: Event,
        msg_time: DateTime<Utc>,
    ) -> Hl7Result<Vec<String>> {
        let s = &self.segments;
        Ok(vec![
            s.build_msh(msg_time, message_type, header)?,
            s.build_evn(
                event.recorded,
                message_type,
                &event.planned,
                patient.attending_doctor.as_ref(),
                &event.occurred,
            )?,
            s.build_pid(&patient.person)?,
        ])
    }

    /// ADT messages laid out as EVN, PID, PD1, PV1 and optionally PV2.
    fn adt_visit(
        &self,
        trigger_event: &str,
        header: &HeaderInfo,
        patient: &PatientInfo,
        event: Event,
        msg_time: DateTime<Utc>,
        with_pv2: bool,
    ) -> Hl7Result<Hl7Message> {
        let message_type = MessageType::new(ADT, trigger_event);
        let s = &self.segments;
        let mut segments = self.adt_head(&message_type, header, patient, event, msg_time)?;
        segments.push(s.build_pd1(patient.primary_facility.as_ref())?);
        segments.push(s.build_pv1(patient)?);
        if with_pv2 {
            segments.push(s.build_pv2(patient)?);
        }
        Ok(self.finish(message_type, header, segments))
    }

    fn push_associated_parties(
        &self,
        segments: &mut Vec<String>,
        patient: &PatientInfo,
    ) -> Hl7Result<()> {
        for (id, party) in patient.associated_parties.iter().enumerate() {
            segments.push(self.segments.build_nk1(id, party)?);
        }
        Ok(())
    }

    fn push_allergies(&self, segments: &mut Vec<String>, patient: &PatientInfo) -> Hl7Result<()> {
        for (id, allergy) in patient.allergies.iter().enumerate() {
            segments.push(self.segments.build_al1(id, allergy)?);
        }
        Ok(())
    }

    fn push_diagnoses(&self, segments: &mut Vec<String>, patient: &PatientInfo) -> Hl7Result<()> {
        for (id, diagnosis) in patient.diagnoses.iter().enumerate() {
            segments.push(self.segments.build_dg1(id, diagnosis)?);
        }
        Ok(())
    }

    fn push_procedures(&self, segments: &mut Vec<String>, patient: &PatientInfo) -> Hl7Result<()> {
        for (id, procedure) in patient.procedures.iter().enumerate() {
            segments.push(self.segments.build_pr1(id, procedure)?);
        }
        Ok(())
    }

    fn push_notes(&self, segments: &mut Vec<String>, notes: &[String]) -> Hl7Result<()> {
        for (id, note) in notes.iter().enumerate() {
            segments.push(self.segments.build_nte(id, note)?);
        }
        Ok(())
    }

    /// MDM^T02: document notification with one OBX per content line.
    pub fn build_document_notification_mdm_t02(
        &self,
        header: &HeaderInfo,
        patient: &PatientInfo,
        document: &Document,
        event_time: DateTime<Utc>,
        msg_time: DateTime<Utc>,
    ) -> Hl7Result<Hl7Message> {
        let message_type = MessageType::new(MDM, "T02");
        let s = &self.segments;
        let mut segments =
            self.adt_head(&message_type, header, patient, Event::at(event_time), msg_time)?;
        segments.push(s.build_pv1(patient)?);
        segments.push(s.build_txa(patient, document)?);
        for (id, line) in document.content_line.iter().enumerate() {
            segments.push(s.build_obx_for_mdm(
                id + 1,
                document.observation_identifier.as_ref(),
                line,
            )?);
        }
        Ok(self.finish(message_type, header, segments))
    }

    /// ORU^R01: unsolicited observation results.
    pub fn build_result_oru_r01(
        &self,
        header: &HeaderInfo,
        patient: &PatientInfo,
        order: &Order,
        msg_time: DateTime<Utc>,
    ) -> Hl7Result<Hl7Message> {
        self.oru("R01", header, patient, order, msg_time)
    }

    /// ORU^R03: display-oriented results.
    pub fn build_result_oru_r03(
        &self,
        header: &HeaderInfo,
        patient: &PatientInfo,
        order: &Order,
        msg_time: DateTime<Utc>,
    ) -> Hl7Result<Hl7Message> {
        self.oru("R03", header, patient, order, msg_time)
    }

    /// ORU^R32: preliminary results.
    pub fn build_result_oru_r32(
        &self,
        header: &HeaderInfo,
        patient: &PatientInfo,
        order: &Order,
        msg_time: DateTime<Utc>,
    ) -> Hl7Result<Hl7Message> {
        self.oru("R32", header, patient, order, msg_time)
    }

    /// MSH, PID, PV1, ORC and OBR followed by the OBX stream.
    ///
    /// Orders with diagnostic service `MDOC` get one OBX per clinical-note content block,
    /// numbered from 1 within each result. Other orders get one OBX per result followed by its
    /// notes; OBX set ids continue after `number_of_previous_results` so that amendments to the
    /// same order do not reuse them.
    fn oru(
        &self,
        trigger_event: &str,
        header: &HeaderInfo,
        patient: &PatientInfo,
        order: &Order,
        msg_time: DateTime<Utc>,
    ) -> Hl7Result<Hl7Message> {
        let message_type = MessageType::new(ORU, trigger_event);
        let s = &self.segments;
        let mut segments = vec![
            s.build_msh(msg_time, &message_type, header)?,
            s.build_pid(&patient.person)?,
            s.build_pv1(patient)?,
            s.build_orc(order)?,
            s.build_obr(order)?,
        ];

        if order.diagnostic_serv_id == DIAGNOSTIC_SERV_ID_MDOC {
            for result in &order.results {
                let contents = result
                    .clinical_note
                    .as_ref()
                    .map_or(0, |note| note.contents.len());
                for index in 0..contents {
                    segments.push(s.build_obx_for_clinical_note(index + 1, index, result, order)?);
                }
            }
        } else {
            for (id, result) in order.results.iter().enumerate() {
                let set_id = order
                    .number_of_previous_results
                    .checked_add(id + 1)
                    .ok_or_else(|| {
                        Hl7Error::InvalidInput(format!(
                            "OBX set id overflows after {} previous results",
                            order.number_of_previous_results
                        ))
                    })?;
                segments.push(s.build_obx(set_id, result)?);
                self.push_notes(&mut segments, &result.notes)?;
            }
        }

        Ok(self.finish(message_type, header, segments))
    }

    /// ORM^O01: order message with order-level notes and ORM results.
    pub fn build_order_orm_o01(
        &self,
        header: &HeaderInfo,
        patient: &PatientInfo,
        order: &Order,
        msg_time: DateTime<Utc>,
    ) -> Hl7Result<Hl7Message> {
        let message_type = MessageType::new(ORM, "O01");
        let s = &self.segments;
        let mut segments = vec![
            s.build_msh(msg_time, &message_type, header)?,
            s.build_pid(&patient.person)?,
            s.build_pv1(patient)?,
            s.build_orc(order)?,
            s.build_obr(order)?,
        ];
        self.push_notes(&mut segments, &order.notes_for_orm)?;
        for (id, result) in order.results_for_orm.iter().enumerate() {
            segments.push(s.build_obx(id + 1, result)?);
            self.push_notes(&mut segments, &result.notes)?;
        }
        Ok(self.finish(message_type, header, segments))
    }

    /// ORR^O02: acknowledgement of a pathology order.
    pub fn build_pathology_orr_o02(
        &self,
        header: &HeaderInfo,
        patient: &PatientInfo,
        order: &Order,
        msg_time: DateTime<Utc>,
    ) -> Hl7Result<Hl7Message> {
        let message_type = MessageType::new(ORR, "O02");
        let s = &self.segments;
        let segments = vec![
            s.build_msh(msg_time, &message_type, header)?,
            s.build_msa(&order.message_control_id_original_order)?,
            s.build_pid(&patient.person)?,
            s.build_orc(order)?,
        ];
        Ok(self.finish(message_type, header, segments))
    }

    /// ADT^A01: admit.
    pub fn build_admission_adt_a01(
        &self,
        header: &HeaderInfo,
        patient: &PatientInfo,
        event_time: DateTime<Utc>,
        msg_time: DateTime<Utc>,
    ) -> Hl7Result<Hl7Message> {
        let message_type = MessageType::new(ADT, "A01");
        let s = &self.segments;
        let mut segments =
            self.adt_head(&message_type, header, patient, Event::at(event_time), msg_time)?;
        segments.push(s.build_pd1(patient.primary_facility.as_ref())?);
        segments.push(s.build_pv1(patient)?);
        segments.push(s.build_pv2(patient)?);
        self.push_associated_parties(&mut segments, patient)?;
        self.push_allergies(&mut segments, patient)?;
        Ok(self.finish(message_type, header, segments))
    }

    /// ADT^A02: transfer.
    pub fn build_transfer_adt_a02(
        &self,
        header: &HeaderInfo,
        patient: &PatientInfo,
        event_time: DateTime<Utc>,
        msg_time: DateTime<Utc>,
    ) -> Hl7Result<Hl7Message> {
        self.adt_visit("A02", header, patient, Event::at(event_time), msg_time, false)
    }

    /// ADT^A03: discharge.
    pub fn build_discharge_adt_a03(
        &self,
        header: &HeaderInfo,
        patient: &PatientInfo,
        event_time: DateTime<Utc>,
        msg_time: DateTime<Utc>,
    ) -> Hl7Result<Hl7Message> {
        let message_type = MessageType::new(ADT, "A03");
        let s = &self.segments;
        let mut segments =
            self.adt_head(&message_type, header, patient, Event::at(event_time), msg_time)?;
        segments.push(s.build_pd1(patient.primary_facility.as_ref())?);
        segments.push(s.build_pv1(patient)?);
        self.push_allergies(&mut segments, patient)?;
        Ok(self.finish(message_type, header, segments))
    }

    /// ADT^A04: register a patient.
    pub fn build_registration_adt_a04(
        &self,
        header: &HeaderInfo,
        patient: &PatientInfo,
        event_time: DateTime<Utc>,
        msg_time: DateTime<Utc>,
    ) -> Hl7Result<Hl7Message> {
        let message_type = MessageType::new(ADT, "A04");
        let s = &self.segments;
        let mut segments =
            self.adt_head(&message_type, header, patient, Event::at(event_time), msg_time)?;
        segments.push(s.build_pd1(patient.primary_facility.as_ref())?);
        segments.push(s.build_pv1(patient)?);
        self.push_associated_parties(&mut segments, patient)?;
        self.push_allergies(&mut segments, patient)?;
        Ok(self.finish(message_type, header, segments))
    }

    /// ADT^A05: pre-admit. EVN carries the expected admission as the planned time.
    pub fn build_pre_admit_adt_a05(
        &self,
        header: &HeaderInfo,
        patient: &PatientInfo,
        event_time: DateTime<Utc>,
        msg_time: DateTime<Utc>,
    ) -> Hl7Result<Hl7Message> {
        let message_type = MessageType::new(ADT, "A05");
        let s = &self.segments;
        let event = Event::at(event_time).planned(patient.expected_admit_date_time);
        let mut segments = self.adt_head(&message_type, header, patient, event, msg_time)?;
        segments.push(s.build_pd1(patient.primary_facility.as_ref())?);
        segments.push(s.build_pv1(patient)?);
        segments.push(s.build_pv2(patient)?);
        self.push_allergies(&mut segments, patient)?;
        self.push_associated_parties(&mut segments, patient)?;
        self.push_diagnoses(&mut segments, patient)?;
        Ok(self.finish(message_type, header, segments))
    }

    /// ADT^A08: update patient information.
    pub fn build_update_patient_adt_a08(
        &self,
        header: &HeaderInfo,
        patient: &PatientInfo,
        event_time: DateTime<Utc>,
        msg_time: DateTime<Utc>,
    ) -> Hl7Result<Hl7Message> {
        self.person_update("A08", header, patient, event_time, msg_time)
    }

    /// ADT^A31: update person information.
    pub fn build_update_person_adt_a31(
        &self,
        header: &HeaderInfo,
        patient: &PatientInfo,
        event_time: DateTime<Utc>,
        msg_time: DateTime<Utc>,
    ) -> Hl7Result<Hl7Message> {
        self.person_update("A31", header, patient, event_time, msg_time)
    }

    /// EVN, PID, a placeholder PV1 and the allergy, diagnosis and procedure groups.
    fn person_update(
        &self,
        trigger_event: &str,
        header: &HeaderInfo,
        patient: &PatientInfo,
        event_time: DateTime<Utc>,
        msg_time: DateTime<Utc>,
    ) -> Hl7Result<Hl7Message> {
        let message_type = MessageType::new(ADT, trigger_event);
        let mut segments =
            self.adt_head(&message_type, header, patient, Event::at(event_time), msg_time)?;
        segments.push(self.segments.build_pseudo_pv1()?);
        self.push_allergies(&mut segments, patient)?;
        self.push_diagnoses(&mut segments, patient)?;
        self.push_procedures(&mut segments, patient)?;
        Ok(self.finish(message_type, header, segments))
    }

    /// ADT^A09: patient departing, tracking.
    pub fn build_track_departure_adt_a09(
        &self,
        header: &HeaderInfo,
        patient: &PatientInfo,
        event_time: DateTime<Utc>,
        msg_time: DateTime<Utc>,
    ) -> Hl7Result<Hl7Message> {
        self.adt_visit("A09", header, patient, Event::at(event_time), msg_time, false)
    }

    /// ADT^A10: patient arriving, tracking.
    pub fn build_track_arrival_adt_a10(
        &self,
        header: &HeaderInfo,
        patient: &PatientInfo,
        event_time: DateTime<Utc>,
        msg_time: DateTime<Utc>,
    ) -> Hl7Result<Hl7Message> {
        self.adt_visit("A10", header, patient, Event::at(event_time), msg_time, false)
    }

    /// ADT^A11: cancel admit. The cancelled admission is the occurred time.
    pub fn build_cancel_visit_adt_a11(
        &self,
        header: &HeaderInfo,
        patient: &PatientInfo,
        event_time: DateTime<Utc>,
        msg_time: DateTime<Utc>,
    ) -> Hl7Result<Hl7Message> {
        let event = Event::at(event_time).occurred(patient.admission_date);
        self.adt_visit("A11", header, patient, event, msg_time, false)
    }

    /// ADT^A12: cancel transfer. The cancelled transfer is the occurred time.
    pub fn build_cancel_transfer_adt_a12(
        &self,
        header: &HeaderInfo,
        patient: &PatientInfo,
        event_time: DateTime<Utc>,
        msg_time: DateTime<Utc>,
    ) -> Hl7Result<Hl7Message> {
        let event = Event::at(event_time).occurred(patient.transfer_date);
        self.adt_visit("A12", header, patient, event, msg_time, false)
    }

    /// ADT^A13: cancel discharge. The cancelled discharge is the occurred time.
    pub fn build_cancel_discharge_adt_a13(
        &self,
        header: &HeaderInfo,
        patient: &PatientInfo,
        event_time: DateTime<Utc>,
        msg_time: DateTime<Utc>,
    ) -> Hl7Result<Hl7Message> {
        let event = Event::at(event_time).occurred(patient.discharge_date);
        self.adt_visit("A13", header, patient, event, msg_time, false)
    }

    /// ADT^A14: pending admit.
    pub fn build_pending_admission_adt_a14(
        &self,
        header: &HeaderInfo,
        patient: &PatientInfo,
        event_time: DateTime<Utc>,
        msg_time: DateTime<Utc>,
    ) -> Hl7Result<Hl7Message> {
        let event = Event::at(event_time).planned(patient.expected_admit_date_time);
        self.adt_visit("A14", header, patient, event, msg_time, true)
    }

    /// ADT^A15: pending transfer. Unlike the other pending events it carries no PV2.
    pub fn build_pending_transfer_adt_a15(
        &self,
        header: &HeaderInfo,
        patient: &PatientInfo,
        event_time: DateTime<Utc>,
        msg_time: DateTime<Utc>,
    ) -> Hl7Result<Hl7Message> {
        let event = Event::at(event_time).planned(patient.expected_transfer_date_time);
        self.adt_visit("A15", header, patient, event, msg_time, false)
    }

    /// ADT^A16: pending discharge.
    pub fn build_pending_discharge_adt_a16(
        &self,
        header: &HeaderInfo,
        patient: &PatientInfo,
        event_time: DateTime<Utc>,
        msg_time: DateTime<Utc>,
    ) -> Hl7Result<Hl7Message> {
        let event = Event::at(event_time).planned(patient.expected_discharge_date_time);
        self.adt_visit("A16", header, patient, event, msg_time, true)
    }

    /// ADT^A17: swap two patients' beds.
    ///
    /// Both patients get a full PID, PD1 and PV1, first `patient` and then `other`. EVN uses
    /// the first patient's attending doctor.
    pub fn build_bed_swap_adt_a17(
        &self,
        header: &HeaderInfo,
        patient: &PatientInfo,
        other: &PatientInfo,
        event_time: DateTime<Utc>,
        msg_time: DateTime<Utc>,
    ) -> Hl7Result<Hl7Message> {
        let message_type = MessageType::new(ADT, "A17");
        let s = &self.segments;
        let mut segments =
            self.adt_head(&message_type, header, patient, Event::at(event_time), msg_time)?;
        segments.push(s.build_pd1(patient.primary_facility.as_ref())?);
        segments.push(s.build_pv1(patient)?);
        segments.push(s.build_pid(&other.person)?);
        segments.push(s.build_pd1(other.primary_facility.as_ref())?);
        segments.push(s.build_pv1(other)?);
        Ok(self.finish(message_type, header, segments))
    }

    /// ADT^A23: delete a visit.
    pub fn build_delete_visit_adt_a23(
        &self,
        header: &HeaderInfo,
        patient: &PatientInfo,
        event_time: DateTime<Utc>,
        msg_time: DateTime<Utc>,
    ) -> Hl7Result<Hl7Message> {
        let message_type = MessageType::new(ADT, "A23");
        let mut segments =
            self.adt_head(&message_type, header, patient, Event::at(event_time), msg_time)?;
        segments.push(self.segments.build_pv1(patient)?);
        Ok(self.finish(message_type, header, segments))
    }

    /// ADT^A25: cancel pending discharge.
    pub fn build_cancel_pending_discharge_adt_a25(
        &self,
        header: &HeaderInfo,
        patient: &PatientInfo,
        event_time: DateTime<Utc>,
        msg_time: DateTime<Utc>,
    ) -> Hl7Result<Hl7Message> {
        let event = Event::at(event_time).occurred(patient.expected_discharge_date_time);
        self.adt_visit("A25", header, patient, event, msg_time, true)
    }

    /// ADT^A26: cancel pending transfer.
    pub fn build_cancel_pending_transfer_adt_a26(
        &self,
        header: &HeaderInfo,
        patient: &PatientInfo,
        event_time: DateTime<Utc>,
        msg_time: DateTime<Utc>,
    ) -> Hl7Result<Hl7Message> {
        let event = Event::at(event_time).occurred(patient.expected_transfer_date_time);
        self.adt_visit("A26", header, patient, event, msg_time, true)
    }

    /// ADT^A27: cancel pending admit.
    pub fn build_cancel_pending_admit_adt_a27(
        &self,
        header: &HeaderInfo,
        patient: &PatientInfo,
        event_time: DateTime<Utc>,
        msg_time: DateTime<Utc>,
    ) -> Hl7Result<Hl7Message> {
        let event = Event::at(event_time).occurred(patient.expected_admit_date_time);
        self.adt_visit("A27", header, patient, event, msg_time, true)
    }

    /// ADT^A28: add person information.
    pub fn build_add_person_adt_a28(
        &self,
        header: &HeaderInfo,
        patient: &PatientInfo,
        event_time: DateTime<Utc>,
        msg_time: DateTime<Utc>,
    ) -> Hl7Result<Hl7Message> {
        let message_type = MessageType::new(ADT, "A28");
        let s = &self.segments;
        let mut segments =
            self.adt_head(&message_type, header, patient, Event::at(event_time), msg_time)?;
        segments.push(s.build_pd1(patient.primary_facility.as_ref())?);
        segments.push(s.build_pseudo_pv1()?);
        self.push_allergies(&mut segments, patient)?;
        Ok(self.finish(message_type, header, segments))
    }

    /// ADT^A34: merge patient information, patient id only.
    pub fn build_merge_adt_a34(
        &self,
        header: &HeaderInfo,
        patient: &PatientInfo,
        event_time: DateTime<Utc>,
        msg_time: DateTime<Utc>,
        prior_mrn: &str,
    ) -> Hl7Result<Hl7Message> {
        let message_type = MessageType::new(ADT, "A34");
        let s = &self.segments;
        let mut segments =
            self.adt_head(&message_type, header, patient, Event::at(event_time), msg_time)?;
        segments.push(s.build_pd1(patient.primary_facility.as_ref())?);
        segments.push(s.build_mrg(&[prior_mrn.to_string()])?);
        Ok(self.finish(message_type, header, segments))
    }

    /// ADT^A40: merge patient, patient identifier list.
    pub fn build_merge_adt_a40(
        &self,
        header: &HeaderInfo,
        patient: &PatientInfo,
        event_time: DateTime<Utc>,
        msg_time: DateTime<Utc>,
        prior_mrns: &[String],
    ) -> Hl7Result<Hl7Message> {
        let message_type = MessageType::new(ADT, "A40");
        let s = &self.segments;
        let mut segments =
            self.adt_head(&message_type, header, patient, Event::at(event_time), msg_time)?;
        segments.push(s.build_pd1(patient.primary_facility.as_ref())?);
        segments.push(s.build_mrg(prior_mrns)?);
        segments.push(s.build_pv1(patient)?);
        Ok(self.finish(message_type, header, segments))
    }

    /// Builds the message named by `request.message_type`.
    ///
    /// # Errors
    ///
    /// - [`Hl7Error::UnsupportedVariant`] if no assembler exists for the type.
    /// - [`Hl7Error::InvalidInput`] if the variant needs an order, a document, a second patient
    ///   or prior MRNs that the request does not carry.
    /// - Any error raised while building a segment.
    pub fn build(&self, request: &BuildRequest<'_>) -> Hl7Result<Hl7Message> {
        let r = request;
        let (h, p, event, msg) = (r.header, r.patient, r.event_time, r.message_time);
        match (r.message_type.code(), r.message_type.trigger_event()) {
            (ADT, "A01") => self.build_admission_adt_a01(h, p, event, msg),
            (ADT, "A02") => self.build_transfer_adt_a02(h, p, event, msg),
            (ADT, "A03") => self.build_discharge_adt_a03(h, p, event, msg),
            (ADT, "A04") => self.build_registration_adt_a04(h, p, event, msg),
            (ADT, "A05") => self.build_pre_admit_adt_a05(h, p, event, msg),
            (ADT, "A08") => self.build_update_patient_adt_a08(h, p, event, msg),
            (ADT, "A09") => self.build_track_departure_adt_a09(h, p, event, msg),
            (ADT, "A10") => self.build_track_arrival_adt_a10(h, p, event, msg),
            (ADT, "A11") => self.build_cancel_visit_adt_a11(h, p, event, msg),
            (ADT, "A12") => self.build_cancel_transfer_adt_a12(h, p, event, msg),
            (ADT, "A13") => self.build_cancel_discharge_adt_a13(h, p, event, msg),
            (ADT, "A14") => self.build_pending_admission_adt_a14(h, p, event, msg),
            (ADT, "A15") => self.build_pending_transfer_adt_a15(h, p, event, msg),
            (ADT, "A16") => self.build_pending_discharge_adt_a16(h, p, event, msg),
            (ADT, "A17") => {
                let other = r.require(r.other_patient, "a second patient")?;
                self.build_bed_swap_adt_a17(h, p, other, event, msg)
            }
            (ADT, "A23") => self.build_delete_visit_adt_a23(h, p, event, msg),
            (ADT, "A25") => self.build_cancel_pending_discharge_adt_a25(h, p, event, msg),
            (ADT, "A26") => self.build_cancel_pending_transfer_adt_a26(h, p, event, msg),
            (ADT, "A27") => self.build_cancel_pending_admit_adt_a27(h, p, event, msg),
            (ADT, "A28") => self.build_add_person_adt_a28(h, p, event, msg),
            (ADT, "A31") => self.build_update_person_adt_a31(h, p, event, msg),
            (ADT, "A34") => {
                let prior_mrn = match r.prior_mrns {
                    [mrn] => mrn,
                    _ => {
                        return Err(Hl7Error::InvalidInput(format!(
                            "{} needs exactly one prior MRN, got {}",
                            r.message_type,
                            r.prior_mrns.len()
                        )))
                    }
                };
                self.build_merge_adt_a34(h, p, event, msg, prior_mrn)
            }
            (ADT, "A40") => {
                if r.prior_mrns.is_empty() {
                    return Err(r.missing("at least one prior MRN"));
                }
                self.build_merge_adt_a40(h, p, event, msg, r.prior_mrns)
            }
            (MDM, "T02") => {
                let document = r.require(r.document, "a document")?;
                self.build_document_notification_mdm_t02(h, p, document, event, msg)
            }
            (ORM, "O01") => self.build_order_orm_o01(h, p, r.require(r.order, "an order")?, msg),
            (ORR, "O02") => {
                self.build_pathology_orr_o02(h, p, r.require(r.order, "an order")?, msg)
            }
            (ORU, "R01") => self.build_result_oru_r01(h, p, r.require(r.order, "an order")?, msg),
            (ORU, "R03") => self.build_result_oru_r03(h, p, r.require(r.order, "an order")?, msg),
            (ORU, "R32") => self.build_result_oru_r32(h, p, r.require(r.order, "an order")?, msg),
            _ => Err(Hl7Error::UnsupportedVariant(r.message_type.clone())),
        }
    }
}

/// Everything [`MessageBuilder::build`] may need for one message.
///
/// Only `message_type`, `header`, `patient` and the two times are always used. The rest is
/// required by some variants only.
#[derive(Clone, Copy, Debug)]
pub struct BuildRequest<'a> {
    pub message_type: &'a MessageType,
    pub header: &'a HeaderInfo,
    pub patient: &'a PatientInfo,
    pub event_time: DateTime<Utc>,
    pub message_time: DateTime<Utc>,
    pub order: Option<&'a Order>,
    pub document: Option<&'a Document>,
    pub other_patient: Option<&'a PatientInfo>,
    pub prior_mrns: &'a [String],
}

impl<'a> BuildRequest<'a> {
    pub fn new(
        message_type: &'a MessageType,
        header: &'a HeaderInfo,
        patient: &'a PatientInfo,
        event_time: DateTime<Utc>,
        message_time: DateTime<Utc>,
    ) -> Self {
        Self {
            message_type,
            header,
            patient,
            event_time,
            message_time,
            order: None,
            document: None,
            other_patient: None,
            prior_mrns: &[],
        }
    }

    pub fn with_order(self, order: &'a Order) -> Self {
        Self {
            order: Some(order),
            ..self
        }
    }

    pub fn with_document(self, document: &'a Document) -> Self {
        Self {
            document: Some(document),
            ..self
        }
    }

    pub fn with_other_patient(self, other_patient: &'a PatientInfo) -> Self {
        Self {
            other_patient: Some(other_patient),
            ..self
        }
    }

    pub fn with_prior_mrns(self, prior_mrns: &'a [String]) -> Self {
        Self { prior_mrns, ..self }
    }

    fn missing(&self, what: &str) -> Hl7Error {
        Hl7Error::InvalidInput(format!("{} needs {what}", self.message_type))
    }

    fn require<T>(&self, value: Option<T>, what: &str) -> Hl7Result<T> {
        value.ok_or_else(|| self.missing(what))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata::{self, utc};
    use sim_record::OrderResult;
    use std::sync::Barrier;

    type AdtBuild = fn(
        &MessageBuilder,
        &HeaderInfo,
        &PatientInfo,
        DateTime<Utc>,
        DateTime<Utc>,
    ) -> Hl7Result<Hl7Message>;

    type OrderBuild =
        fn(&MessageBuilder, &HeaderInfo, &PatientInfo, &Order, DateTime<Utc>) -> Hl7Result<Hl7Message>;

    fn builder() -> MessageBuilder {
        MessageBuilder::new(testdata::london_config())
    }

    fn event_time() -> DateTime<Utc> {
        utc(2018, 4, 28, 22, 38, 14)
    }

    fn msg_time() -> DateTime<Utc> {
        utc(2018, 4, 28, 22, 39, 14)
    }

    fn names(message: &Hl7Message) -> Vec<&str> {
        message
            .segments()
            .map(|segment| segment.split('|').next().unwrap_or_default())
            .collect()
    }

    /// Field `n` of every segment named `name`, counting MSH-1 as the separator itself.
    fn fields<'m>(message: &'m Hl7Message, name: &str, n: usize) -> Vec<&'m str> {
        message
            .segments()
            .filter(|segment| segment.starts_with(&format!("{name}|")))
            .map(|segment| segment.split('|').nth(n).unwrap_or_default())
            .collect()
    }

    fn build_adt(build: AdtBuild) -> Hl7Message {
        build(
            &builder(),
            &testdata::header(),
            &testdata::patient_info(),
            event_time(),
            msg_time(),
        )
        .expect("message should build")
    }

    #[test]
    fn test_message_type_parse_and_display() {
        let parsed: MessageType = "ADT^A01".parse().unwrap();
        assert_eq!(parsed, MessageType::new("ADT", "A01"));
        assert_eq!(parsed.to_string(), "ADT^A01");
        assert!(parsed.is_supported());
        assert!(!MessageType::new("ADT", "A99").is_supported());
    }

    #[test]
    fn test_message_type_rejects_malformed_text() {
        for text in ["ADT", "ADT^", "^A01", "ADT^A01^X", ""] {
            let err = text
                .parse::<MessageType>()
                .expect_err("malformed type should fail");
            assert!(matches!(err, Hl7Error::InvalidInput(_)), "{text}: {err:?}");
        }
    }

    #[test]
    fn test_message_display_replaces_terminators() {
        let message = Hl7Message {
            message_type: MessageType::new("ADT", "A01"),
            text: "MSH|a\rEVN|b".to_string(),
        };
        assert_eq!(
            message.to_string(),
            "message:[type:ADT^A01 msg:MSH|a EVN|b]"
        );
    }

    #[test]
    fn test_admission_adt_a01() {
        let message = build_adt(MessageBuilder::build_admission_adt_a01);
        assert_eq!(
            names(&message),
            ["MSH", "EVN", "PID", "PD1", "PV1", "PV2", "NK1", "AL1"]
        );
        assert_eq!(fields(&message, "MSH", 8), ["ADT^A01"]);
        assert_eq!(fields(&message, "MSH", 6), ["20180428233914"]);
        assert_eq!(fields(&message, "EVN", 1), ["A01"]);
        assert_eq!(fields(&message, "EVN", 2), ["20180428233814"]);
        assert_eq!(fields(&message, "PV2", 3), ["^Eye problems"]);
        assert_eq!(fields(&message, "NK1", 1), ["0"]);
        assert_eq!(fields(&message, "AL1", 1), ["0"]);
        assert!(!message.text().ends_with('\r'));
    }

    #[test]
    fn test_visit_layouts() {
        let plain: [(&str, AdtBuild); 6] = [
            ("A02", MessageBuilder::build_transfer_adt_a02),
            ("A09", MessageBuilder::build_track_departure_adt_a09),
            ("A10", MessageBuilder::build_track_arrival_adt_a10),
            ("A11", MessageBuilder::build_cancel_visit_adt_a11),
            ("A12", MessageBuilder::build_cancel_transfer_adt_a12),
            ("A13", MessageBuilder::build_cancel_discharge_adt_a13),
        ];
        for (event, build) in plain {
            let message = build_adt(build);
            assert_eq!(names(&message), ["MSH", "EVN", "PID", "PD1", "PV1"], "{event}");
            assert_eq!(message.message_type().trigger_event(), event);
        }

        let message = build_adt(MessageBuilder::build_pending_transfer_adt_a15);
        assert_eq!(names(&message), ["MSH", "EVN", "PID", "PD1", "PV1"]);

        let with_pv2: [AdtBuild; 5] = [
            MessageBuilder::build_pending_admission_adt_a14,
            MessageBuilder::build_pending_discharge_adt_a16,
            MessageBuilder::build_cancel_pending_discharge_adt_a25,
            MessageBuilder::build_cancel_pending_transfer_adt_a26,
            MessageBuilder::build_cancel_pending_admit_adt_a27,
        ];
        for build in with_pv2 {
            let message = build_adt(build);
            assert_eq!(names(&message), ["MSH", "EVN", "PID", "PD1", "PV1", "PV2"]);
        }
    }

    #[test]
    fn test_event_planned_and_occurred_times() {
        // EVN-3 is the planned time and EVN-6 the occurred time.
        let cases: [(AdtBuild, &str, &str); 10] = [
            (MessageBuilder::build_pre_admit_adt_a05, "20170126152422", ""),
            (MessageBuilder::build_cancel_visit_adt_a11, "", "20170126152421"),
            (MessageBuilder::build_cancel_transfer_adt_a12, "", "20180428233813"),
            (MessageBuilder::build_cancel_discharge_adt_a13, "", "20180226152421"),
            (MessageBuilder::build_pending_admission_adt_a14, "20170126152422", ""),
            (MessageBuilder::build_pending_transfer_adt_a15, "20170126152424", ""),
            (MessageBuilder::build_pending_discharge_adt_a16, "20170126152423", ""),
            (MessageBuilder::build_cancel_pending_discharge_adt_a25, "", "20170126152423"),
            (MessageBuilder::build_cancel_pending_transfer_adt_a26, "", "20170126152424"),
            (MessageBuilder::build_cancel_pending_admit_adt_a27, "", "20170126152422"),
        ];
        for (build, planned, occurred) in cases {
            let message = build_adt(build);
            let event = message.message_type().to_string();
            assert_eq!(fields(&message, "EVN", 3), [planned], "{event}");
            assert_eq!(fields(&message, "EVN", 6), [occurred], "{event}");
        }

        let message = build_adt(MessageBuilder::build_admission_adt_a01);
        assert_eq!(fields(&message, "EVN", 3), [""]);
        assert_eq!(fields(&message, "EVN", 6), [""]);
    }

    #[test]
    fn test_discharge_and_registration_layouts() {
        let message = build_adt(MessageBuilder::build_discharge_adt_a03);
        assert_eq!(names(&message), ["MSH", "EVN", "PID", "PD1", "PV1", "AL1"]);

        let message = build_adt(MessageBuilder::build_registration_adt_a04);
        assert_eq!(
            names(&message),
            ["MSH", "EVN", "PID", "PD1", "PV1", "NK1", "AL1"]
        );

        let message = build_adt(MessageBuilder::build_pre_admit_adt_a05);
        assert_eq!(
            names(&message),
            ["MSH", "EVN", "PID", "PD1", "PV1", "PV2", "AL1", "NK1", "DG1"]
        );
    }

    #[test]
    fn test_person_updates_use_placeholder_visit() {
        let builds: [AdtBuild; 2] = [
            MessageBuilder::build_update_patient_adt_a08,
            MessageBuilder::build_update_person_adt_a31,
        ];
        for build in builds {
            let message = build_adt(build);
            assert_eq!(
                names(&message),
                ["MSH", "EVN", "PID", "PV1", "AL1", "DG1", "PR1"]
            );
            assert!(message.text().contains("\rPV1|1|N|\r"));
        }

        let message = build_adt(MessageBuilder::build_add_person_adt_a28);
        assert_eq!(names(&message), ["MSH", "EVN", "PID", "PD1", "PV1", "AL1"]);
        assert_eq!(fields(&message, "PV1", 2), ["N"]);
    }

    #[test]
    fn test_delete_visit_adt_a23() {
        let message = build_adt(MessageBuilder::build_delete_visit_adt_a23);
        assert_eq!(names(&message), ["MSH", "EVN", "PID", "PV1"]);
    }

    #[test]
    fn test_bed_swap_adt_a17() {
        let mut patient = testdata::patient_info();
        if let Some(location) = patient.location.as_mut() {
            location.poc = "onc-poc".into();
        }
        let mut other = testdata::patient_info();
        if let Some(location) = other.location.as_mut() {
            location.poc = "another-poc".into();
        }

        let message = builder()
            .build_bed_swap_adt_a17(&testdata::header(), &patient, &other, event_time(), msg_time())
            .unwrap();
        assert_eq!(
            names(&message),
            ["MSH", "EVN", "PID", "PD1", "PV1", "PID", "PD1", "PV1"]
        );
        let locations = fields(&message, "PV1", 3);
        assert_eq!(locations.len(), 2);
        assert_ne!(locations[0], locations[1]);
    }

    #[test]
    fn test_merges() {
        let b = builder();
        let header = testdata::header();
        let patient = testdata::patient_info();

        let a34 = b
            .build_merge_adt_a34(&header, &patient, event_time(), msg_time(), "123")
            .unwrap();
        assert_eq!(names(&a34), ["MSH", "EVN", "PID", "PD1", "MRG"]);
        assert_eq!(fields(&a34, "MRG", 1), ["123^^^SIMULATOR MRN^MRN"]);

        let mrns = ["123".to_string(), "456".to_string()];
        let a40 = b
            .build_merge_adt_a40(&header, &patient, event_time(), msg_time(), &mrns)
            .unwrap();
        assert_eq!(names(&a40), ["MSH", "EVN", "PID", "PD1", "MRG", "PV1"]);
        assert_eq!(
            fields(&a40, "MRG", 1),
            ["123^^^SIMULATOR MRN^MRN~456^^^SIMULATOR MRN^MRN"]
        );
    }

    #[test]
    fn test_result_oru() {
        let event = utc(2018, 4, 28, 22, 38, 44);
        let b = builder();
        let header = testdata::header();
        let patient = testdata::patient_info();
        let order = testdata::order_with_result(event);

        let builds: [(&str, OrderBuild); 3] = [
            ("R01", MessageBuilder::build_result_oru_r01),
            ("R03", MessageBuilder::build_result_oru_r03),
            ("R32", MessageBuilder::build_result_oru_r32),
        ];
        for (trigger, build) in builds {
            let message = build(&b, &header, &patient, &order, msg_time()).unwrap();
            assert_eq!(fields(&message, "MSH", 8), [format!("ORU^{trigger}")]);
            assert_eq!(
                names(&message),
                ["MSH", "PID", "PV1", "ORC", "OBR", "OBX", "NTE", "NTE", "OBX"]
            );
            assert_eq!(fields(&message, "OBX", 1), ["1", "2"]);
            assert_eq!(fields(&message, "NTE", 1), ["0", "1"]);
        }
    }

    #[test]
    fn test_result_oru_clinical_note() {
        let order = testdata::order_with_clinical_note(utc(2018, 4, 28, 22, 38, 44), "some-content");
        let message = builder()
            .build_result_oru_r01(&testdata::header(), &testdata::patient_info(), &order, msg_time())
            .unwrap();
        assert_eq!(
            names(&message),
            ["MSH", "PID", "PV1", "ORC", "OBR", "OBX", "OBX"]
        );
        assert_eq!(fields(&message, "OBX", 1), ["1", "2"]);
        assert_eq!(fields(&message, "OBR", 3), ["document_id"]);
    }

    #[test]
    fn test_result_oru_clinical_note_ids_restart_per_result() {
        let mut order = testdata::order_with_clinical_note(utc(2018, 4, 28, 22, 38, 44), "first");
        let second = order.results[0].clone();
        order.results.push(second);

        let message = builder()
            .build_result_oru_r01(&testdata::header(), &testdata::patient_info(), &order, msg_time())
            .unwrap();
        assert_eq!(
            names(&message),
            ["MSH", "PID", "PV1", "ORC", "OBR", "OBX", "OBX", "OBX", "OBX"]
        );
        assert_eq!(fields(&message, "OBX", 1), ["1", "2", "1", "2"]);
    }

    #[test]
    fn test_result_oru_continues_after_previous_results() {
        let mut order = testdata::order_with_result(utc(2018, 4, 28, 22, 38, 44));
        order.number_of_previous_results = 7;
        let third = OrderResult {
            value: "710".into(),
            notes: vec!["Note3".into(), "Note4".into()],
            ..order.results[0].clone()
        };
        order.results.push(third);

        let message = builder()
            .build_result_oru_r32(&testdata::header(), &testdata::patient_info(), &order, msg_time())
            .unwrap();
        assert_eq!(fields(&message, "OBX", 1), ["8", "9", "10"]);
    }

    #[test]
    fn test_result_oru_rejects_set_id_overflow() {
        let mut order = testdata::order_with_result(utc(2018, 4, 28, 22, 38, 44));
        order.number_of_previous_results = usize::MAX;

        let err = builder()
            .build_result_oru_r01(&testdata::header(), &testdata::patient_info(), &order, msg_time())
            .expect_err("set id past usize::MAX should fail");
        match err {
            Hl7Error::InvalidInput(msg) => assert!(msg.contains("overflows"), "{msg}"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_order_orm_o01() {
        let mut order = testdata::order(utc(2018, 4, 28, 22, 38, 44));
        order.results_for_orm = vec![OrderResult {
            test_name: Some(sim_record::CodedElement {
                id: "random-test-id".into(),
                ..Default::default()
            }),
            ..OrderResult::default()
        }];
        order.notes_for_orm = vec!["Random order Note 1".into(), "Random order Note 2".into()];

        let message = builder()
            .build_order_orm_o01(&testdata::header(), &testdata::patient_info(), &order, msg_time())
            .unwrap();
        assert_eq!(
            names(&message),
            ["MSH", "PID", "PV1", "ORC", "OBR", "NTE", "NTE", "OBX"]
        );
        assert_eq!(fields(&message, "OBX", 1), ["1"]);
        assert_eq!(fields(&message, "OBX", 3), ["random-test-id^^^^"]);
        assert_eq!(
            fields(&message, "NTE", 3),
            ["Random order Note 1", "Random order Note 2"]
        );
    }

    #[test]
    fn test_pathology_orr_o02() {
        let mut order = testdata::order(event_time());
        order.message_control_id_original_order = "42".into();
        let message = builder()
            .build_pathology_orr_o02(&testdata::header(), &testdata::patient_info(), &order, msg_time())
            .unwrap();
        assert_eq!(names(&message), ["MSH", "MSA", "PID", "ORC"]);
        assert_eq!(fields(&message, "MSA", 1), ["AA"]);
        assert_eq!(fields(&message, "MSA", 2), ["42"]);
    }

    #[test]
    fn test_document_notification_mdm_t02() {
        let message = builder()
            .build_document_notification_mdm_t02(
                &testdata::header(),
                &testdata::patient_info(),
                &testdata::document(),
                event_time(),
                msg_time(),
            )
            .unwrap();
        assert_eq!(
            names(&message),
            ["MSH", "EVN", "PID", "PV1", "TXA", "OBX", "OBX"]
        );
        assert_eq!(fields(&message, "EVN", 1), ["T02"]);
        assert_eq!(fields(&message, "OBX", 1), ["1", "2"]);
        assert_eq!(fields(&message, "OBX", 2), ["TX", "TX"]);
    }

    #[test]
    fn test_failing_segment_fails_the_message() {
        let mut patient = testdata::patient_info();
        patient.diagnoses[0].description = None;

        let err = builder()
            .build_pre_admit_adt_a05(&testdata::header(), &patient, event_time(), msg_time())
            .expect_err("diagnosis without description should fail");
        assert_eq!(err.segment(), Some("DG1"));
    }

    #[test]
    fn test_build_dispatches_every_supported_variant() {
        let header = testdata::header();
        let patient = testdata::patient_info();
        let other = testdata::patient_info();
        let order = testdata::order_with_result(event_time());
        let document = testdata::document();
        let single = ["123".to_string()];

        for (code, event) in SUPPORTED_VARIANTS {
            let message_type = MessageType::new(*code, *event);
            let request = BuildRequest::new(&message_type, &header, &patient, event_time(), msg_time())
                .with_order(&order)
                .with_document(&document)
                .with_other_patient(&other)
                .with_prior_mrns(&single);
            let message = builder()
                .build(&request)
                .unwrap_or_else(|e| panic!("{message_type}: {e}"));
            assert_eq!(message.message_type(), &message_type);
            assert_eq!(fields(&message, "MSH", 8), [message_type.to_string()]);
        }
    }

    #[test]
    fn test_build_rejects_unknown_variant() {
        let header = testdata::header();
        let patient = testdata::patient_info();
        let message_type = MessageType::new("ADT", "A99");
        let request = BuildRequest::new(&message_type, &header, &patient, event_time(), msg_time());

        match builder().build(&request).expect_err("unknown variant should fail") {
            Hl7Error::UnsupportedVariant(t) => assert_eq!(t, message_type),
            other => panic!("expected UnsupportedVariant, got {other:?}"),
        }
    }

    #[test]
    fn test_build_reports_missing_inputs() {
        let header = testdata::header();
        let patient = testdata::patient_info();
        for text in ["ORU^R01", "ORM^O01", "ORR^O02", "MDM^T02", "ADT^A17", "ADT^A34", "ADT^A40"] {
            let message_type: MessageType = text.parse().unwrap();
            let request =
                BuildRequest::new(&message_type, &header, &patient, event_time(), msg_time());
            let err = builder()
                .build(&request)
                .expect_err("missing input should fail");
            assert!(matches!(err, Hl7Error::InvalidInput(_)), "{text}: {err:?}");
        }
    }

    #[test]
    fn test_build_is_deterministic_across_threads() {
        const THREADS: usize = 8;

        let header = testdata::header();
        let patient = testdata::patient_info();
        let other = testdata::patient_info();
        let order = testdata::order_with_result(event_time());
        let document = testdata::document();
        let prior_mrns = ["123".to_string()];
        let message_types: Vec<MessageType> = SUPPORTED_VARIANTS
            .iter()
            .map(|(code, event)| MessageType::new(*code, *event))
            .collect();
        let requests: Vec<BuildRequest<'_>> = message_types
            .iter()
            .map(|message_type| {
                BuildRequest::new(message_type, &header, &patient, event_time(), msg_time())
                    .with_order(&order)
                    .with_document(&document)
                    .with_other_patient(&other)
                    .with_prior_mrns(&prior_mrns)
            })
            .collect();

        let b = builder();
        let build_all = || -> Vec<String> {
            requests
                .iter()
                .map(|request| {
                    b.build(request)
                        .unwrap_or_else(|e| panic!("{}: {e}", request.message_type))
                        .text()
                        .to_string()
                })
                .collect()
        };

        // All threads start together so the first use of the template set may be concurrent.
        let barrier = Barrier::new(THREADS);
        let per_thread: Vec<Vec<String>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    scope.spawn(|| {
                        barrier.wait();
                        build_all()
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().expect("thread should not panic"))
                .collect()
        });

        let expected = build_all();
        assert_eq!(build_all(), expected);
        assert_eq!(expected.len(), SUPPORTED_VARIANTS.len());
        for texts in per_thread {
            assert_eq!(texts, expected);
        }
    }
}
