//! Segment template library.
//!
//! Each segment and each composite data type has one layout: the literal wire text with
//! `{slot}` placeholders where values go. Layouts are parsed once into a [`TemplateSet`] held by
//! [`TEMPLATES`] and never modified afterwards, so rendering needs no synchronisation.
//!
//! A slot bound to `None` renders as nothing while the surrounding delimiters stay in place.
//! This is how an absent composite (a missing doctor, an unknown location) disappears from a
//! field without shifting the positions of the fields after it. A slot with no binding at all is
//! an error.

use crate::{Hl7Error, Hl7Result, RenderCause};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Every template known to the library.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TemplateId {
    // Segments.
    Msh,
    Msa,
    Evn,
    Pid,
    Pd1,
    Pv1,
    PseudoPv1,
    Pv2,
    Nk1,
    Al1,
    Orc,
    Obr,
    ObrClinicalNote,
    Obx,
    ObxClinicalNote,
    ObxForMdm,
    Nte,
    Mrg,
    Dg1,
    Pr1,
    Txa,
    // Composite data types.
    Location,
    Doctor,
    PersonName,
    Address,
    HomeNumber,
    CodedElement,
    CodedNote,
    AdmitReason,
    PrimaryFacility,
    VisitId,
    Mrn,
    NoteValue,
}

impl TemplateId {
    pub fn name(self) -> &'static str {
        match self {
            Self::Msh => "MSH",
            Self::Msa => "MSA",
            Self::Evn => "EVN",
            Self::Pid => "PID",
            Self::Pd1 => "PD1",
            Self::Pv1 => "PV1",
            Self::PseudoPv1 => "PseudoPV1",
            Self::Pv2 => "PV2",
            Self::Nk1 => "NK1",
            Self::Al1 => "AL1",
            Self::Orc => "ORC",
            Self::Obr => "OBR",
            Self::ObrClinicalNote => "OBRClinicalNote",
            Self::Obx => "OBX",
            Self::ObxClinicalNote => "OBXClinicalNote",
            Self::ObxForMdm => "OBXForMDM",
            Self::Nte => "NTE",
            Self::Mrg => "MRG",
            Self::Dg1 => "DG1",
            Self::Pr1 => "PR1",
            Self::Txa => "TXA",
            Self::Location => "PL",
            Self::Doctor => "XCN",
            Self::PersonName => "XPN",
            Self::Address => "XAD",
            Self::HomeNumber => "XTN",
            Self::CodedElement => "CE",
            Self::CodedNote => "CENote",
            Self::AdmitReason => "CEAdmitReason",
            Self::PrimaryFacility => "XON",
            Self::VisitId => "CXVisit",
            Self::Mrn => "CXMRN",
            Self::NoteValue => "NoteValue",
        }
    }
}

// ============================================================================
// Layouts
// ============================================================================

/// Raw layouts for the standard template set.
pub const LAYOUTS: &[(TemplateId, &str)] = &[
    // PL: Person Location.
    (
        TemplateId::Location,
        "{poc}^{room}^{bed}^{facility}^^{location_type}^{building}^{floor}",
    ),
    // XCN: Extended Composite ID Number And Name For Persons.
    (
        TemplateId::Doctor,
        "{id}^{surname}^{first_name}^^^{prefix}^^^DRNBR^PRSNL^^^ORGDR",
    ),
    // XPN: Extended Person Name.
    (
        TemplateId::PersonName,
        "{surname}^{first_name}^{middle_name}^{suffix}^{prefix}^{degree}^CURRENT",
    ),
    // XAD: Extended Address.
    (
        TemplateId::Address,
        "{first_line}^{second_line}^{city}^^{postal_code}^{country}^{type}",
    ),
    // XTN: Extended Telecommunication Number.
    (TemplateId::HomeNumber, "{number}^HOME"),
    // CE: Coded Element.
    (
        TemplateId::CodedElement,
        "{id}^{text}^{coding_system}^^{alternate_text}",
    ),
    // Observation identifier of a clinical note: the document type, twice.
    (TemplateId::CodedNote, "{document_type}^{document_type}"),
    // PV2-3 Admit Reason: text only.
    (TemplateId::AdmitReason, "^{reason}"),
    // XON: Extended Composite Name And Identification Number For Organizations.
    (TemplateId::PrimaryFacility, "{organization}^^{id}"),
    // CX: Extended Composite ID with Check Digit.
    (TemplateId::VisitId, "{visit_id}^^^^visitid"),
    (TemplateId::Mrn, "{mrn}^^^SIMULATOR MRN^MRN"),
    // OBX-5 for clinical documents.
    (
        TemplateId::NoteValue,
        "^^{content_type}^{document_encoding}^{document_content}",
    ),
    (
        TemplateId::Msh,
        "MSH|^~\\&|{sending_application}|{sending_facility}|{receiving_application}|{receiving_facility}|{date_time}||{message_code}^{trigger_event}|{message_control_id}|T|{version}|||AL||44|ASCII",
    ),
    (TemplateId::Msa, "MSA|AA|{original_control_id}"),
    (
        TemplateId::Evn,
        "EVN|{trigger_event}|{recorded}|{planned}||{operator}|{occurred}",
    ),
    (
        TemplateId::Pid,
        "PID|1|{mrn}|{mrn}~{nhs}^^^NHSNBR^NHSNMBR||{name}||{birth}|{gender}|||{address}||{home_phone}|||||||||{ethnicity}|||||||{date_of_death}|{death_indicator}",
    ),
    (TemplateId::Pd1, "PD1|||{primary_facility}|"),
    (
        TemplateId::Pv1,
        "PV1|1|{class}|{location}|28b||{prior_location}|{attending_doctor}|||{hospital_service}|{temporary_location}|||||||{patient_type}|{visit_id}||||||||||||||||||||||{account_status}|{pending_location}|{prior_temporary_location}|{admission_date}|{discharge_date}|",
    ),
    // Visit-agnostic PV1 with patient class N (not applicable).
    (TemplateId::PseudoPv1, "PV1|1|N|"),
    (
        TemplateId::Pv2,
        "PV2|{prior_pending_location}||{admit_reason}|||||{expected_admit}|{expected_discharge}",
    ),
    (
        TemplateId::Nk1,
        "NK1|{set_id}|{name}|{relationship}|{address}|{home_phone}||{contact_role}||||||||{gender}|",
    ),
    (
        TemplateId::Al1,
        "AL1|{set_id}|{type}|{description}|{severity}|{reaction}|{identified}",
    ),
    (
        TemplateId::Orc,
        "ORC|{order_control}|{placer}|{filler}||{order_status}||||{order_date_time}",
    ),
    (
        TemplateId::Obr,
        "OBR|1|{placer}|{filler}|{order_profile}||{order_date_time}|{collected_date_time}|||||||{received_in_lab_date_time}|{specimen_source}|{ordering_provider}||||||{reported_date_time}||{diagnostic_serv_id}|{results_status}||1",
    ),
    (
        TemplateId::ObrClinicalNote,
        "OBR|1|{placer}|{document_id}|{order_profile}||{order_date_time}|{collected_date_time}|||||||{received_in_lab_date_time}|{specimen_source}|{ordering_provider}||||||{reported_date_time}||{diagnostic_serv_id}|{results_status}||1",
    ),
    (
        TemplateId::Obx,
        "OBX|{set_id}|{value_type}|{test_name}||{value}|{unit}|{range}|{abnormal_flag}|||{status}|||{observation_date_time}||",
    ),
    (
        TemplateId::ObxClinicalNote,
        "OBX|{set_id}|{value_type}|{note_type}||{note_value}|||||||||{observation_date_time}||{ordering_provider}",
    ),
    (
        TemplateId::ObxForMdm,
        "OBX|{set_id}|TX|{observation_identifier}|1|{content}||||||F||||||",
    ),
    (TemplateId::Nte, "NTE|{set_id}||{note}|"),
    (TemplateId::Mrg, "MRG|{prior_identifiers}|"),
    (
        TemplateId::Dg1,
        "DG1|{set_id}|SNMCT|{description}|{description_text}|{date_time}|{type}|||||||||0|{clinician}",
    ),
    (
        TemplateId::Pr1,
        "PR1|{set_id}|SNMCT|{description}|{description_text}|{date_time}|{type}||||||{clinician}||0||",
    ),
    (
        TemplateId::Txa,
        "TXA|1|{document_type}||{activity_date_time}|{attending_doctor}|||{edit_date_time}||||{unique_document_number}|||||{document_completion_status}||||||",
    ),
];

/// The process-wide template set, parsed on first use.
///
/// # Panics
///
/// Panics on first access if [`LAYOUTS`] is malformed. The builders cannot work with a partial
/// set, so this is treated as a fatal start-up failure.
pub static TEMPLATES: LazyLock<TemplateSet> = LazyLock::new(|| match TemplateSet::standard() {
    Ok(set) => set,
    Err(err) => panic!("HL7 template library failed to initialise: {err}"),
});

// ============================================================================
// Templates
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Slot(String),
}

/// A parsed layout.
#[derive(Clone, Debug)]
pub struct Template {
    id: TemplateId,
    pieces: Vec<Piece>,
}

impl Template {
    /// Parses `layout` into literal text and `{slot}` placeholders.
    ///
    /// # Errors
    ///
    /// Returns [`Hl7Error::TemplateParse`] for an unterminated or stray brace, or a slot name
    /// that is empty or not `snake_case`.
    pub fn parse(id: TemplateId, layout: &str) -> Hl7Result<Self> {
        let parse_error = |reason: String| Hl7Error::TemplateParse {
            template: id.name(),
            reason,
        };

        let mut pieces = Vec::new();
        let mut rest = layout;
        while let Some(open) = rest.find('{') {
            let (literal, after_open) = rest.split_at(open);
            if literal.contains('}') {
                return Err(parse_error("unmatched '}'".into()));
            }
            if !literal.is_empty() {
                pieces.push(Piece::Literal(literal.to_string()));
            }

            let after_open = &after_open[1..];
            let close = after_open
                .find('}')
                .ok_or_else(|| parse_error("unterminated slot".into()))?;
            let slot = &after_open[..close];
            if slot.is_empty() || !slot.chars().all(|c| c.is_ascii_lowercase() || c == '_') {
                return Err(parse_error(format!("invalid slot name '{slot}'")));
            }
            pieces.push(Piece::Slot(slot.to_string()));
            rest = &after_open[close + 1..];
        }

        if rest.contains('}') {
            return Err(parse_error("unmatched '}'".into()));
        }
        if !rest.is_empty() {
            pieces.push(Piece::Literal(rest.to_string()));
        }

        Ok(Self { id, pieces })
    }

    pub fn id(&self) -> TemplateId {
        self.id
    }

    /// Slot names in layout order; a slot used twice appears twice.
    pub fn slots(&self) -> impl Iterator<Item = &str> {
        self.pieces.iter().filter_map(|piece| match piece {
            Piece::Slot(name) => Some(name.as_str()),
            Piece::Literal(_) => None,
        })
    }

    /// Renders the template with `bindings`.
    ///
    /// # Errors
    ///
    /// Returns [`Hl7Error::TemplateRender`] with [`RenderCause::UnboundSlot`] if any slot has no
    /// binding.
    pub fn render(&self, bindings: &Bindings) -> Hl7Result<String> {
        let mut rendered = String::new();
        for piece in &self.pieces {
            match piece {
                Piece::Literal(text) => rendered.push_str(text),
                Piece::Slot(name) => match bindings.get(name) {
                    Some(Some(value)) => rendered.push_str(value),
                    Some(None) => {}
                    None => {
                        return Err(Hl7Error::TemplateRender {
                            template: self.id.name(),
                            cause: RenderCause::UnboundSlot(name.clone()),
                        })
                    }
                },
            }
        }
        Ok(rendered)
    }
}

/// Values for the slots of one template.
#[derive(Clone, Debug, Default)]
pub struct Bindings {
    values: HashMap<&'static str, Option<String>>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a value that is always rendered, even when empty.
    pub fn with(mut self, slot: &'static str, value: impl Into<String>) -> Self {
        self.values.insert(slot, Some(value.into()));
        self
    }

    /// Binds a value that renders as nothing when `None`.
    pub fn with_optional(mut self, slot: &'static str, value: Option<String>) -> Self {
        self.values.insert(slot, value);
        self
    }

    /// `None` when the slot is unbound, `Some(None)` when bound to an absent value.
    pub fn get(&self, slot: &str) -> Option<Option<&str>> {
        self.values.get(slot).map(|value| value.as_deref())
    }
}

/// An immutable collection of parsed templates.
#[derive(Clone, Debug)]
pub struct TemplateSet {
    templates: HashMap<TemplateId, Template>,
}

impl TemplateSet {
    /// Parses every layout. Fails on the first malformed layout or a duplicated id.
    pub fn parse(layouts: &[(TemplateId, &str)]) -> Hl7Result<Self> {
        let mut templates = HashMap::with_capacity(layouts.len());
        for (id, layout) in layouts {
            let template = Template::parse(*id, layout)?;
            if templates.insert(*id, template).is_some() {
                return Err(Hl7Error::TemplateParse {
                    template: id.name(),
                    reason: "defined more than once".into(),
                });
            }
        }
        Ok(Self { templates })
    }

    /// The set built from [`LAYOUTS`].
    pub fn standard() -> Hl7Result<Self> {
        Self::parse(LAYOUTS)
    }

    pub fn get(&self, id: TemplateId) -> Hl7Result<&Template> {
        self.templates
            .get(&id)
            .ok_or_else(|| Hl7Error::TemplateRender {
                template: id.name(),
                cause: RenderCause::UnknownTemplate,
            })
    }

    pub fn render(&self, id: TemplateId, bindings: &Bindings) -> Hl7Result<String> {
        self.get(id)?.render(bindings)
    }
}
