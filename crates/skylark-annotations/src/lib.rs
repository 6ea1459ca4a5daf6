//! Skylark Annotations
//!
//! This crate holds the answer-side data model for one classification:
//! the values a user can record for a task, the [`AnnotationRecorder`]
//! that accumulates them in visitation order, and the immutable
//! [`Classification`] record produced when a subject is finished.
//!
//! Nothing in this crate performs I/O. The recorder is a pure
//! order-preserving key→value store keyed by task id; toggle semantics
//! for multi-select tasks belong to the caller (see [`toggle`]).

mod classification;
mod recorder;
mod value;

pub use classification::{Classification, ClassificationMetadata};
pub use recorder::AnnotationRecorder;
pub use value::{Annotation, AnnotationValue, toggle};
