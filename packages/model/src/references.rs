//! Reference sites: places in the tree that name another object's fx:id.

use crate::document::FxomDocument;
use crate::ids::is_valid_fx_id;
use crate::object::{IntrinsicKind, ObjectId};
use crate::property::PropertyId;
use crate::visitor::{walk_document, walk_object, walk_property, Visitor};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReferenceSite {
    /// `fx:reference` or `fx:copy` placeholder
    Intrinsic(ObjectId),
    /// Text property holding `$id`
    Expression(PropertyId),
}

/// Target of an expression reference: `$ok` names `ok`. Bindings (`${..}`),
/// escapes (`\$`) and property paths are not references.
pub fn expression_reference_target(text: &str) -> Option<&str> {
    let target = text.strip_prefix('$')?;
    is_valid_fx_id(target).then_some(target)
}

impl ReferenceSite {
    /// fx:id this site points at
    pub fn target<'d>(&self, document: &'d FxomDocument) -> Option<&'d str> {
        match *self {
            ReferenceSite::Intrinsic(object) => {
                let intrinsic = document.object(object)?.as_intrinsic()?;
                intrinsic
                    .kind
                    .targets_fx_id()
                    .then_some(intrinsic.source.as_str())
            }
            ReferenceSite::Expression(property) => {
                expression_reference_target(document.property(property)?.text()?)
            }
        }
    }

    /// Object holding the site
    pub fn holder(&self, document: &FxomDocument) -> Option<ObjectId> {
        match *self {
            ReferenceSite::Intrinsic(object) => Some(object),
            ReferenceSite::Expression(property) => document.property(property)?.owner(),
        }
    }

    /// `fx:copy` sites do not keep their target alive
    pub fn is_copy(&self, document: &FxomDocument) -> bool {
        match *self {
            ReferenceSite::Intrinsic(object) => document
                .object(object)
                .and_then(|o| o.as_intrinsic())
                .map(|i| i.kind == IntrinsicKind::Copy)
                .unwrap_or(false),
            ReferenceSite::Expression(_) => false,
        }
    }
}

struct ReferenceCollector<'a> {
    filter: Option<&'a str>,
    sites: Vec<ReferenceSite>,
}

impl ReferenceCollector<'_> {
    fn offer(&mut self, document: &FxomDocument, site: ReferenceSite) {
        if let Some(target) = site.target(document) {
            if self.filter.map_or(true, |f| f == target) {
                self.sites.push(site);
            }
        }
    }
}

impl Visitor for ReferenceCollector<'_> {
    fn visit_object(&mut self, document: &FxomDocument, object: ObjectId) {
        if document[object].as_intrinsic().is_some() {
            self.offer(document, ReferenceSite::Intrinsic(object));
        }
        walk_object(self, document, object);
    }

    fn visit_property(&mut self, document: &FxomDocument, property: PropertyId) {
        if document[property].is_text() {
            self.offer(document, ReferenceSite::Expression(property));
        }
        walk_property(self, document, property);
    }
}

impl FxomDocument {
    /// Reference sites in the attached tree, in document order. With a
    /// filter, only the sites pointing at that fx:id.
    pub fn collect_references(&self, fx_id: Option<&str>) -> Vec<ReferenceSite> {
        let mut collector = ReferenceCollector {
            filter: fx_id,
            sites: Vec::new(),
        };
        walk_document(&mut collector, self);
        collector.sites
    }

    /// Reference sites inside the subtree of `object`
    pub fn collect_references_in(&self, object: ObjectId, fx_id: Option<&str>) -> Vec<ReferenceSite> {
        let mut collector = ReferenceCollector {
            filter: fx_id,
            sites: Vec::new(),
        };
        collector.visit_object(self, object);
        collector.sites
    }

    /// Object the site denotes, when declared in the attached tree
    pub fn resolve_reference(&self, site: ReferenceSite) -> Option<ObjectId> {
        self.search_with_fx_id(site.target(self)?)
    }

    /// Sites whose target is not declared anywhere in the attached tree
    pub fn unresolved_references(&self) -> Vec<ReferenceSite> {
        let declared = self.collect_fx_ids();
        self.collect_references(None)
            .into_iter()
            .filter(|site| {
                site.target(self)
                    .map_or(true, |target| !declared.contains_key(target))
            })
            .collect()
    }
}
