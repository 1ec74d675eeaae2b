//! The document arena and its structural primitives.

use crate::object::{
    Collection, FxomObject, Instance, Intrinsic, IntrinsicKind, ObjectId, ObjectKind, ParentLink,
    Script,
};
use crate::property::{FxomProperty, PropertyId, PropertyKind, PropertyName};
use crate::realize::{Realized, Realizer};
use slotmap::SlotMap;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::ops::Index;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use tracing::{debug, trace};

static NEXT_DOCUMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique document identity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(u64);

impl DocumentId {
    fn next() -> Self {
        DocumentId(NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Sent to observers whenever a revision counter moves
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RevisionChange {
    pub scene_graph_revision: u64,
    pub css_revision: u64,
}

/// Imports declared by the document.
///
/// Entries are either a class (`javafx.scene.control.Button`) or a package
/// wildcard (`javafx.scene.layout.*`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassContext {
    imports: Vec<String>,
}

impl ClassContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_import(&mut self, import: impl Into<String>) {
        let import = import.into();
        if !self.imports.contains(&import) {
            self.imports.push(import);
        }
    }

    pub fn imports(&self) -> &[String] {
        &self.imports
    }

    /// Qualified candidates for `type_name`, most specific first. The simple
    /// name always comes last.
    pub fn resolve(&self, type_name: &str) -> Vec<String> {
        if type_name.contains('.') {
            return vec![type_name.to_string()];
        }

        let mut candidates = Vec::new();
        for import in &self.imports {
            if let Some(package) = import.strip_suffix(".*") {
                candidates.push(format!("{}.{}", package, type_name));
            } else if import.rsplit('.').next() == Some(type_name) {
                // Exact class imports win over wildcards
                candidates.insert(0, import.clone());
            }
        }
        candidates.push(type_name.to_string());
        candidates
    }
}

fn is_style_property(name: &PropertyName) -> bool {
    !name.is_attached() && matches!(name.name(), "style" | "styleClass" | "stylesheets")
}

/// FXOM document: arena of objects and properties plus the root handle.
pub struct FxomDocument {
    pub(crate) id: DocumentId,
    pub(crate) objects: SlotMap<ObjectId, FxomObject>,
    pub(crate) properties: SlotMap<PropertyId, FxomProperty>,
    pub(crate) root: Option<ObjectId>,
    class_context: ClassContext,
    location: Option<PathBuf>,
    scene_graph_revision: u64,
    css_revision: u64,
    update_depth: usize,
    scene_graph_dirty: bool,
    css_dirty: bool,
    /// Objects whose parent or child lists changed since the last refresh
    stale: HashSet<ObjectId>,
    realizer: Option<Arc<dyn Realizer>>,
    observers: Vec<mpsc::Sender<RevisionChange>>,
}

impl Default for FxomDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FxomDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FxomDocument")
            .field("id", &self.id)
            .field("root", &self.root)
            .field("objects", &self.objects.len())
            .field("properties", &self.properties.len())
            .field("scene_graph_revision", &self.scene_graph_revision)
            .field("css_revision", &self.css_revision)
            .field("location", &self.location)
            .finish()
    }
}

impl FxomDocument {
    pub fn new() -> Self {
        Self {
            id: DocumentId::next(),
            objects: SlotMap::with_key(),
            properties: SlotMap::with_key(),
            root: None,
            class_context: ClassContext::new(),
            location: None,
            scene_graph_revision: 0,
            css_revision: 0,
            update_depth: 0,
            scene_graph_dirty: false,
            css_dirty: false,
            stale: HashSet::new(),
            realizer: None,
            observers: Vec::new(),
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn root(&self) -> Option<ObjectId> {
        self.root
    }

    pub fn class_context(&self) -> &ClassContext {
        &self.class_context
    }

    pub fn class_context_mut(&mut self) -> &mut ClassContext {
        &mut self.class_context
    }

    /// File the document was loaded from, if any
    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    pub fn set_location(&mut self, location: Option<PathBuf>) {
        self.location = location;
    }

    pub fn scene_graph_revision(&self) -> u64 {
        self.scene_graph_revision
    }

    pub fn css_revision(&self) -> u64 {
        self.css_revision
    }

    pub fn object(&self, id: ObjectId) -> Option<&FxomObject> {
        self.objects.get(id)
    }

    pub fn property(&self, id: PropertyId) -> Option<&FxomProperty> {
        self.properties.get(id)
    }

    /// Number of objects in the arena, detached ones included
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    // ---------------------------------------------------------------------
    // Creation (detached)
    // ---------------------------------------------------------------------

    fn create(&mut self, kind: ObjectKind) -> ObjectId {
        let owner = self.id;
        self.objects.insert(FxomObject::new(owner, kind))
    }

    pub fn create_instance(&mut self, type_name: impl Into<String>) -> ObjectId {
        self.create(ObjectKind::Instance(Instance {
            type_name: type_name.into(),
            fx_root: false,
            fx_controller: None,
            properties: Vec::new(),
        }))
    }

    pub fn create_collection(&mut self, type_name: impl Into<String>) -> ObjectId {
        self.create(ObjectKind::Collection(Collection {
            type_name: type_name.into(),
            items: Vec::new(),
        }))
    }

    pub fn create_intrinsic(&mut self, kind: IntrinsicKind, source: impl Into<String>) -> ObjectId {
        self.create(ObjectKind::Intrinsic(Intrinsic {
            kind,
            source: source.into(),
            properties: Vec::new(),
        }))
    }

    pub fn create_comment(&mut self, text: impl Into<String>) -> ObjectId {
        self.create(ObjectKind::Comment(text.into()))
    }

    pub fn create_define(&mut self) -> ObjectId {
        self.create(ObjectKind::Define(Vec::new()))
    }

    pub fn create_script(&mut self, source: Option<String>, body: impl Into<String>) -> ObjectId {
        self.create(ObjectKind::Script(Script {
            source,
            body: body.into(),
        }))
    }

    pub fn create_text_property(
        &mut self,
        name: impl Into<PropertyName>,
        value: impl Into<String>,
    ) -> PropertyId {
        self.properties.insert(FxomProperty {
            name: name.into(),
            owner: None,
            kind: PropertyKind::Text(value.into()),
        })
    }

    pub fn create_collection_property(&mut self, name: impl Into<PropertyName>) -> PropertyId {
        self.properties.insert(FxomProperty {
            name: name.into(),
            owner: None,
            kind: PropertyKind::Collection(Vec::new()),
        })
    }

    // ---------------------------------------------------------------------
    // Structural primitives
    // ---------------------------------------------------------------------

    /// Attaches a detached property to `object` at `index` (end when `None`).
    pub fn add_property(&mut self, object: ObjectId, property: PropertyId, index: Option<usize>) {
        let name = {
            let prop = &self.properties[property];
            assert!(prop.owner.is_none(), "property {:?} already has an owner", property);
            prop.name.clone()
        };
        assert!(
            self.find_property(object, &name).is_none(),
            "object {:?} already has a property named `{}`",
            object,
            name
        );
        for &value in self.properties[property].values() {
            assert!(
                !self.is_ancestor_or_self(value, object),
                "adding property {:?} to {:?} would create a cycle",
                property,
                object
            );
        }

        let list = self.objects[object]
            .properties_mut()
            .unwrap_or_else(|| panic!("object {:?} cannot carry properties", object));
        let index = index.unwrap_or(list.len());
        assert!(index <= list.len(), "property index {} out of bounds", index);
        list.insert(index, property);
        self.properties[property].owner = Some(object);

        // Text values reach realized objects through accessors instead
        if self.properties[property].is_collection() {
            self.stale.insert(object);
            self.stale.extend(self.properties[property].values().iter().copied());
        }
        self.did_change(is_style_property(&name));
    }

    /// Detaches `property` from its owner and returns the owner and the
    /// position it occupied.
    pub fn remove_property(&mut self, property: PropertyId) -> (ObjectId, usize) {
        let owner = self.properties[property]
            .owner
            .take()
            .unwrap_or_else(|| panic!("property {:?} has no owner", property));
        let list = self.objects[owner]
            .properties_mut()
            .unwrap_or_else(|| panic!("owner {:?} cannot carry properties", owner));
        let index = list
            .iter()
            .position(|p| *p == property)
            .unwrap_or_else(|| panic!("owner {:?} does not list property {:?}", owner, property));
        list.remove(index);

        if self.properties[property].is_collection() {
            self.stale.insert(owner);
        }
        let css = is_style_property(&self.properties[property].name);
        self.did_change(css);
        (owner, index)
    }

    /// Inserts a detached object as a value of a collection property.
    pub fn add_value(&mut self, property: PropertyId, value: ObjectId, index: Option<usize>) {
        let index = index.unwrap_or_else(|| self.properties[property].values().len());
        self.insert_into(ParentLink::Property(property), value, index);
    }

    /// Inserts a detached object as an item of a `Collection` or `Define`.
    pub fn add_item(&mut self, container: ObjectId, item: ObjectId, index: Option<usize>) {
        let index = index.unwrap_or_else(|| self.objects[container].items().len());
        self.insert_into(ParentLink::Container(container), item, index);
    }

    /// Attaches `object` under `link` at `index`.
    pub fn insert_into(&mut self, link: ParentLink, object: ObjectId, index: usize) {
        {
            let obj = &self.objects[object];
            assert_eq!(obj.owner, self.id, "object {:?} belongs to another document", object);
            assert!(obj.parent.is_none(), "object {:?} already has a parent", object);
        }
        assert!(self.root != Some(object), "root {:?} cannot be given a parent", object);
        if let Some(container) = self.link_object(link) {
            assert!(
                !self.is_ancestor_or_self(object, container),
                "inserting {:?} under {:?} would create a cycle",
                object,
                container
            );
        }

        let css = match link {
            ParentLink::Property(property) => {
                let prop = &mut self.properties[property];
                let css = is_style_property(&prop.name);
                let values = prop
                    .values_mut()
                    .unwrap_or_else(|| panic!("property {:?} is not a collection", property));
                assert!(index <= values.len(), "value index {} out of bounds", index);
                values.insert(index, object);
                css
            }
            ParentLink::Container(container) => {
                let items = self.objects[container]
                    .items_mut()
                    .unwrap_or_else(|| panic!("object {:?} is not a container", container));
                assert!(index <= items.len(), "item index {} out of bounds", index);
                items.insert(index, object);
                false
            }
        };
        self.objects[object].parent = Some(link);
        let parent = self.link_object(link);
        self.stale.insert(object);
        self.stale.extend(parent);
        self.did_change(css);
    }

    /// Detaches `object` from its parent, returning the link and index it had.
    pub fn remove_from_parent(&mut self, object: ObjectId) -> (ParentLink, usize) {
        let link = self.objects[object]
            .parent
            .take()
            .unwrap_or_else(|| panic!("object {:?} has no parent", object));
        let list = self.sibling_list_mut(link);
        let index = list
            .iter()
            .position(|o| *o == object)
            .unwrap_or_else(|| panic!("parent does not list object {:?}", object));
        list.remove(index);

        let css = match link {
            ParentLink::Property(property) => is_style_property(&self.properties[property].name),
            ParentLink::Container(_) => false,
        };
        let parent = self.link_object(link);
        self.stale.insert(object);
        self.stale.extend(parent);
        self.did_change(css);
        (link, index)
    }

    /// Moves `object` to `index` among its siblings (index measured after
    /// removal). Returns the previous index.
    pub fn move_within_parent(&mut self, object: ObjectId, index: usize) -> usize {
        let link = self.objects[object]
            .parent
            .unwrap_or_else(|| panic!("object {:?} has no parent", object));
        let list = self.sibling_list_mut(link);
        let old = list
            .iter()
            .position(|o| *o == object)
            .unwrap_or_else(|| panic!("parent does not list object {:?}", object));
        list.remove(old);
        assert!(index <= list.len(), "sibling index {} out of bounds", index);
        list.insert(index, object);

        if old != index {
            let parent = self.link_object(link);
            self.stale.extend(parent);
            self.did_change(false);
        }
        old
    }

    /// Replaces the root, returning the previous one (left detached).
    pub fn set_root(&mut self, root: Option<ObjectId>) -> Option<ObjectId> {
        if let Some(root) = root {
            let obj = &self.objects[root];
            assert_eq!(obj.owner, self.id, "object {:?} belongs to another document", root);
            assert!(obj.parent.is_none(), "new root {:?} has a parent", root);
        }
        let previous = std::mem::replace(&mut self.root, root);
        if previous != root {
            self.stale.extend(root);
            self.did_change(true);
        }
        previous
    }

    pub fn set_fx_id(&mut self, object: ObjectId, fx_id: Option<String>) -> Option<String> {
        let obj = &mut self.objects[object];
        if fx_id.is_some() {
            assert!(obj.accepts_fx_id(), "object {:?} cannot carry an fx:id", object);
        }
        let previous = std::mem::replace(&mut obj.fx_id, fx_id);
        self.did_change(false);
        previous
    }

    pub fn set_fx_controller(
        &mut self,
        object: ObjectId,
        controller: Option<String>,
    ) -> Option<String> {
        let instance = self.instance_mut(object);
        let previous = std::mem::replace(&mut instance.fx_controller, controller);
        self.did_change(false);
        previous
    }

    pub fn set_fx_root(&mut self, object: ObjectId, fx_root: bool) -> bool {
        let instance = self.instance_mut(object);
        let previous = std::mem::replace(&mut instance.fx_root, fx_root);
        self.did_change(false);
        previous
    }

    /// Replaces the value of a text property, returning the old value.
    pub fn set_text(&mut self, property: PropertyId, value: impl Into<String>) -> String {
        let prop = &mut self.properties[property];
        let css = is_style_property(&prop.name);
        let previous = match &mut prop.kind {
            PropertyKind::Text(text) => std::mem::replace(text, value.into()),
            PropertyKind::Collection(_) => {
                panic!("property {:?} is not a text property", property)
            }
        };
        self.did_change(css);
        previous
    }

    pub fn set_intrinsic_source(&mut self, object: ObjectId, source: impl Into<String>) -> String {
        let previous = match &mut self.objects[object].kind {
            ObjectKind::Intrinsic(intrinsic) => std::mem::replace(&mut intrinsic.source, source.into()),
            _ => panic!("object {:?} is not an intrinsic", object),
        };
        self.did_change(false);
        previous
    }

    pub fn set_realized(&mut self, object: ObjectId, realized: Option<Realized>) -> Option<Realized> {
        std::mem::replace(&mut self.objects[object].realized, realized)
    }

    pub fn realized_mut(&mut self, object: ObjectId) -> Option<&mut Realized> {
        self.objects.get_mut(object)?.realized.as_mut()
    }

    /// Appends `value` to the collection property `name` of `object`,
    /// creating the property when missing.
    pub fn append_value(
        &mut self,
        object: ObjectId,
        name: impl Into<PropertyName>,
        value: ObjectId,
    ) -> PropertyId {
        let name = name.into();
        let property = match self.find_property(object, &name) {
            Some(property) => property,
            None => {
                let property = self.create_collection_property(name);
                self.add_property(object, property, None);
                property
            }
        };
        self.add_value(property, value, None);
        property
    }

    fn instance_mut(&mut self, object: ObjectId) -> &mut Instance {
        match &mut self.objects[object].kind {
            ObjectKind::Instance(instance) => instance,
            _ => panic!("object {:?} is not an instance", object),
        }
    }

    fn sibling_list_mut(&mut self, link: ParentLink) -> &mut Vec<ObjectId> {
        match link {
            ParentLink::Property(property) => self.properties[property]
                .values_mut()
                .unwrap_or_else(|| panic!("property {:?} is not a collection", property)),
            ParentLink::Container(container) => self.objects[container]
                .items_mut()
                .unwrap_or_else(|| panic!("object {:?} is not a container", container)),
        }
    }

    fn link_object(&self, link: ParentLink) -> Option<ObjectId> {
        match link {
            ParentLink::Property(property) => self.properties[property].owner,
            ParentLink::Container(container) => Some(container),
        }
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    pub fn parent_link(&self, object: ObjectId) -> Option<ParentLink> {
        self.objects.get(object)?.parent
    }

    pub fn parent_object(&self, object: ObjectId) -> Option<ObjectId> {
        self.link_object(self.parent_link(object)?)
    }

    pub fn parent_property(&self, object: ObjectId) -> Option<PropertyId> {
        match self.parent_link(object)? {
            ParentLink::Property(property) => Some(property),
            ParentLink::Container(_) => None,
        }
    }

    /// Siblings of `object`, itself included
    pub fn siblings(&self, object: ObjectId) -> &[ObjectId] {
        match self.parent_link(object) {
            Some(ParentLink::Property(property)) => self.properties[property].values(),
            Some(ParentLink::Container(container)) => self.objects[container].items(),
            None => &[],
        }
    }

    pub fn index_in_parent(&self, object: ObjectId) -> Option<usize> {
        self.parent_link(object)?;
        self.siblings(object).iter().position(|o| *o == object)
    }

    /// Direct children: property values in property order, then items
    pub fn child_objects(&self, object: ObjectId) -> Vec<ObjectId> {
        let obj = &self.objects[object];
        let mut children = Vec::new();
        for &property in obj.properties() {
            children.extend_from_slice(self.properties[property].values());
        }
        children.extend_from_slice(obj.items());
        children
    }

    pub fn find_property(&self, object: ObjectId, name: &PropertyName) -> Option<PropertyId> {
        self.objects
            .get(object)?
            .properties()
            .iter()
            .copied()
            .find(|p| &self.properties[*p].name == name)
    }

    /// Text value of property `name` on `object`
    pub fn text_of(&self, object: ObjectId, name: &PropertyName) -> Option<&str> {
        self.properties[self.find_property(object, name)?].text()
    }

    /// Whether `object` is reachable from the root
    pub fn is_attached(&self, object: ObjectId) -> bool {
        let mut current = object;
        while let Some(parent) = self.parent_object(current) {
            current = parent;
        }
        self.root == Some(current)
    }

    pub fn is_ancestor_or_self(&self, ancestor: ObjectId, object: ObjectId) -> bool {
        let mut current = Some(object);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent_object(id);
        }
        false
    }

    /// Ancestors of `object`, nearest first
    pub fn ancestors(&self, object: ObjectId) -> Vec<ObjectId> {
        let mut ancestors = Vec::new();
        let mut current = self.parent_object(object);
        while let Some(id) = current {
            ancestors.push(id);
            current = self.parent_object(id);
        }
        ancestors
    }

    /// Top-most ancestor first, `object` last
    pub fn path_from_root(&self, object: ObjectId) -> Vec<ObjectId> {
        let mut path = self.ancestors(object);
        path.reverse();
        path.push(object);
        path
    }

    /// Attached objects in pre-order
    pub fn document_order(&self) -> Vec<ObjectId> {
        match self.root {
            Some(root) => self.subtree(root),
            None => Vec::new(),
        }
    }

    /// `object` and everything below it, in pre-order
    pub fn subtree(&self, object: ObjectId) -> Vec<ObjectId> {
        let mut order = Vec::new();
        let mut stack = vec![object];
        while let Some(id) = stack.pop() {
            order.push(id);
            let children = self.child_objects(id);
            stack.extend(children.into_iter().rev());
        }
        order
    }

    /// Everything below `object`, in pre-order
    pub fn descendants(&self, object: ObjectId) -> Vec<ObjectId> {
        let mut subtree = self.subtree(object);
        subtree.remove(0);
        subtree
    }

    /// First attached object declaring `fx_id`, in document order
    pub fn search_with_fx_id(&self, fx_id: &str) -> Option<ObjectId> {
        self.document_order()
            .into_iter()
            .find(|id| self.objects[*id].fx_id() == Some(fx_id))
    }

    /// fx:ids declared in the attached tree, each mapped to its first declarer
    pub fn collect_fx_ids(&self) -> BTreeMap<String, ObjectId> {
        let mut ids = BTreeMap::new();
        for id in self.document_order() {
            if let Some(fx_id) = self.objects[id].fx_id() {
                ids.entry(fx_id.to_string()).or_insert(id);
            }
        }
        ids
    }

    /// fx:ids declared inside the subtree of `object`
    pub fn fx_ids_in(&self, object: ObjectId) -> HashSet<String> {
        self.subtree(object)
            .into_iter()
            .filter_map(|id| self.objects[id].fx_id().map(str::to_string))
            .collect()
    }

    // ---------------------------------------------------------------------
    // Revisions, observers, realization
    // ---------------------------------------------------------------------

    /// Opens a coalescing scope. Scopes nest; only the outermost close flushes.
    pub fn begin_update(&mut self) {
        self.update_depth += 1;
    }

    pub fn end_update(&mut self) {
        assert!(self.update_depth > 0, "end_update without begin_update");
        self.update_depth -= 1;
        if self.update_depth == 0 {
            self.flush();
        }
    }

    pub fn is_updating(&self) -> bool {
        self.update_depth > 0
    }

    /// Signals a stylesheet change made outside the tree
    pub fn css_revision_did_change(&mut self) {
        self.css_revision += 1;
        self.notify();
    }

    pub fn subscribe(&mut self) -> mpsc::Receiver<RevisionChange> {
        let (tx, rx) = mpsc::channel();
        self.observers.push(tx);
        rx
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub fn set_realizer(&mut self, realizer: Option<Arc<dyn Realizer>>) {
        self.realizer = realizer;
        self.refresh();
    }

    /// Realizes attached objects that have no representation yet, rebuilds
    /// the ones whose structure changed along with their ancestors, and drops
    /// the representations held by detached ones.
    pub fn refresh(&mut self) {
        let stale = std::mem::take(&mut self.stale);
        let Some(realizer) = self.realizer.clone() else {
            return;
        };

        let attached = self.document_order();
        let attached_set: HashSet<ObjectId> = attached.iter().copied().collect();
        for (id, object) in self.objects.iter_mut() {
            if !attached_set.contains(&id) {
                object.realized = None;
            }
        }

        let mut rebuild: HashSet<ObjectId> = HashSet::new();
        for object in stale.into_iter().filter(|id| attached_set.contains(id)) {
            rebuild.extend(self.ancestors(object));
            rebuild.insert(object);
        }

        let declared = self.collect_fx_ids();
        let mut built: Vec<(ObjectId, Option<Realized>)> = Vec::new();
        for id in attached {
            let object = &self.objects[id];
            let dangling = object
                .as_intrinsic()
                .map(|i| i.kind.targets_fx_id() && !declared.contains_key(&i.source))
                .unwrap_or(false);
            if dangling {
                if object.realized.is_some() {
                    built.push((id, None));
                }
            } else if object.realized.is_none() || rebuild.contains(&id) {
                built.push((id, realizer.realize(self, id)));
            }
        }
        let mut unresolved = 0usize;
        for (id, realized) in built {
            unresolved += usize::from(realized.is_none());
            self.objects[id].realized = realized;
        }
        if unresolved > 0 {
            debug!(unresolved, "objects left without a realized representation");
        }
    }

    fn did_change(&mut self, css: bool) {
        self.scene_graph_dirty = true;
        self.css_dirty |= css;
        if self.update_depth == 0 {
            self.flush();
        }
    }

    fn flush(&mut self) {
        if !self.scene_graph_dirty {
            return;
        }
        self.scene_graph_revision += 1;
        if self.css_dirty {
            self.css_revision += 1;
        }
        self.scene_graph_dirty = false;
        self.css_dirty = false;
        trace!(
            scene_graph = self.scene_graph_revision,
            css = self.css_revision,
            "revision"
        );
        self.refresh();
        self.notify();
    }

    fn notify(&mut self) {
        let change = RevisionChange {
            scene_graph_revision: self.scene_graph_revision,
            css_revision: self.css_revision,
        };
        self.observers.retain(|tx| tx.send(change).is_ok());
    }

    // ---------------------------------------------------------------------
    // Transfer between documents
    // ---------------------------------------------------------------------

    /// Copies the subtree of `object` from `source` into this arena, detached.
    pub fn import_subtree(&mut self, source: &FxomDocument, object: ObjectId) -> ObjectId {
        let snapshot = source.snapshot_object(object);
        self.materialize(&snapshot)
    }

    /// Moves the subtree of `object` out of `source` into this arena.
    ///
    /// The subtree is detached from `source` first and its nodes leave the
    /// source arena. Realized representations travel with their nodes.
    pub fn move_subtree_from(&mut self, source: &mut FxomDocument, object: ObjectId) -> ObjectId {
        if source.parent_link(object).is_some() {
            source.remove_from_parent(object);
        } else if source.root == Some(object) {
            source.set_root(None);
        }

        let snapshot = source.snapshot_object(object);
        let old_order = source.subtree(object);
        let moved = self.materialize(&snapshot);
        let new_order = self.subtree(moved);
        debug_assert_eq!(old_order.len(), new_order.len());

        for (old, new) in old_order.iter().zip(&new_order) {
            let realized = source.objects[*old].realized.take();
            self.objects[*new].realized = realized;
        }
        source.purge(&old_order);
        moved
    }

    fn purge(&mut self, objects: &[ObjectId]) {
        for id in objects {
            if let Some(object) = self.objects.remove(*id) {
                for property in object.properties() {
                    self.properties.remove(*property);
                }
            }
        }
    }
}

impl Index<ObjectId> for FxomDocument {
    type Output = FxomObject;

    fn index(&self, id: ObjectId) -> &FxomObject {
        self.objects
            .get(id)
            .unwrap_or_else(|| panic!("stale object handle {:?}", id))
    }
}

impl Index<PropertyId> for FxomDocument {
    type Output = FxomProperty;

    fn index(&self, id: PropertyId) -> &FxomProperty {
        self.properties
            .get(id)
            .unwrap_or_else(|| panic!("stale property handle {:?}", id))
    }
}
