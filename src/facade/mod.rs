mod session;

pub use session::{FieldEditFailure, FieldEditOutcome, FieldEditView, RecordView, Session};
