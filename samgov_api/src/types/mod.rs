mod envelope;
pub use self::envelope::SearchEnvelope;

mod resources;
pub use self::resources::{AttachmentGroup, Embedded, ResourceEnvelope};
