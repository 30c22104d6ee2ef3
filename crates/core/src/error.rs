use crate::MessageType;

/// Errors raised while building HL7v2 messages.
#[derive(Debug, thiserror::Error)]
pub enum Hl7Error {
    #[error("found time with non-UTC location: {timezone}")]
    NonUtcTimestamp { timezone: String },
    #[error("cannot render template {template}: {cause}")]
    TemplateRender {
        template: &'static str,
        cause: RenderCause,
    },
    #[error("cannot build {segment} segment: {source}")]
    Segment {
        segment: &'static str,
        #[source]
        source: Box<Hl7Error>,
    },
    #[error("cannot parse template {template}: {reason}")]
    TemplateParse {
        template: &'static str,
        reason: String,
    },
    #[error("unsupported message type: {0}")]
    UnsupportedVariant(MessageType),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Why a template could not be rendered.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RenderCause {
    #[error("slot `{0}` has no binding")]
    UnboundSlot(String),
    #[error("template is not defined")]
    UnknownTemplate,
    #[error("missing {0}")]
    MissingData(&'static str),
}

impl Hl7Error {
    /// Name of the segment that failed, for errors raised by a segment builder.
    pub fn segment(&self) -> Option<&'static str> {
        match self {
            Self::Segment { segment, .. } => Some(segment),
            _ => None,
        }
    }

    /// The innermost error, with segment context removed.
    pub fn root_cause(&self) -> &Hl7Error {
        match self {
            Self::Segment { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

pub type Hl7Result<T> = std::result::Result<T, Hl7Error>;
