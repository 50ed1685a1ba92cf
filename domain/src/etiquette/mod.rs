//! Governance that comments.
//!
//! The [`EtiquetteAdvisor`] turns an agent's trust zone, personality and
//! recent history into an [`EtiquetteAnnotation`]: a tone hint, caution
//! flags and an advisory delay. Annotations ride along with results. They
//! never influence admission or routing.

pub mod advisor;
pub mod annotation;

pub use advisor::{EtiquetteAdvisor, EtiquetteRules};
pub use annotation::{EtiquetteAnnotation, ToneHint, flags};
