//! # FXOM Object Model
//!
//! In-memory typed tree mirroring a UI markup document.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ parser (external): markup text → snapshot   │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ model: FxomDocument arena                   │
//! │  - Objects and properties behind handles    │
//! │  - Parent/child bookkeeping                 │
//! │  - Revision counters + observers            │
//! │  - Realized representations (optional)      │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: jobs, undo/redo, selection          │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Handles, not pointers**: parent links are handles stored on the child,
//!    children are ordered handle lists on the container
//! 2. **Detach, don't drop**: removed subtrees stay in the arena so undo can
//!    re-attach the very same handles
//! 3. **Fail fast**: structural primitives assert their preconditions
//! 4. **No behavior**: the model does bookkeeping; editing semantics live in jobs
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fxom_model::{FxomDocument, PropertyName};
//!
//! let mut doc = FxomDocument::new();
//! let vbox = doc.create_instance("VBox");
//! let button = doc.create_instance("Button");
//! doc.set_root(Some(vbox));
//! doc.append_value(vbox, PropertyName::new("children"), button);
//!
//! assert_eq!(doc.parent_object(button), Some(vbox));
//! ```

mod clone;
mod document;
mod errors;
mod ids;
mod invariants;
mod metadata;
mod object;
mod property;
mod realize;
mod references;
mod snapshot;
mod visitor;

pub use clone::FxomCloner;
pub use document::{ClassContext, DocumentId, FxomDocument, RevisionChange};
pub use errors::{ModelError, ModelResult};
pub use ids::{is_valid_fx_id, FxIdGenerator};
pub use invariants::check_invariants;
pub use metadata::{InMemoryCatalog, MetadataCatalog, PropertyAccessor, PropertyMetadata};
pub use object::{
    Collection, FxomObject, Instance, Intrinsic, IntrinsicKind, ObjectId, ObjectKind, ParentLink,
    Script,
};
pub use property::{FxomProperty, PropertyId, PropertyKind, PropertyName};
pub use realize::{Realized, Realizer, SceneObject};
pub use references::{expression_reference_target, ReferenceSite};
pub use snapshot::{NodeSnapshot, PropertySnapshot, SnapshotValue};
pub use visitor::{walk_document, walk_object, walk_property, Visitor};
