pub mod archive;
pub mod attachment;
pub mod form;
pub mod payment;
pub mod surface;

pub use archive::{ArchiveLocation, IngestionResult};
pub use attachment::{Attachment, AttachmentRef};
pub use form::StructuredForm;
pub use payment::PaymentRecord;
pub use surface::SurfaceContext;
