//! html5ever TreeSink that builds an owned [`Document`].
//!
//! The tree builder needs shared handles it can re-parent freely (adoption
//! agency, foster parenting), so nodes live behind `Rc` while parsing and are
//! converted into owned [`Node`]s in `finish`.

use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use html5ever::tendril::StrTendril;
use html5ever::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{Attribute as Html5Attribute, QualName};

use super::{Attribute, Doctype, Document, Element, Node};

pub(crate) type Handle = Rc<SinkNode>;

pub(crate) enum SinkData {
    Document,
    Doctype(Doctype),
    Text(RefCell<String>),
    Comment(String),
    Element {
        name: QualName,
        attrs: RefCell<Vec<Attribute>>,
    },
}

pub(crate) struct SinkNode {
    data: SinkData,
    parent: Cell<Option<Weak<SinkNode>>>,
    children: RefCell<Vec<Handle>>,
}

impl SinkNode {
    fn new(data: SinkData) -> Handle {
        Rc::new(Self {
            data,
            parent: Cell::new(None),
            children: RefCell::new(Vec::new()),
        })
    }

    fn parent(&self) -> Option<Handle> {
        let weak = self.parent.take()?;
        let parent = weak.upgrade();
        self.parent.set(Some(weak));
        parent
    }

    fn to_node(&self) -> Option<Node> {
        Some(match &self.data {
            SinkData::Document => return None,
            SinkData::Doctype(d) => Node::Doctype(d.clone()),
            SinkData::Text(t) => Node::Text(t.borrow().clone()),
            SinkData::Comment(c) => Node::Comment(c.clone()),
            SinkData::Element { name, attrs } => Node::Element(Element {
                name: name.clone(),
                attrs: attrs.borrow().clone(),
                children: convert_children(self),
            }),
        })
    }
}

fn convert_children(node: &SinkNode) -> Vec<Node> {
    node.children
        .borrow()
        .iter()
        .filter_map(|child| child.to_node())
        .collect()
}

fn convert_attrs(attrs: Vec<Html5Attribute>) -> Vec<Attribute> {
    attrs
        .into_iter()
        .map(|a| Attribute {
            name: a.name,
            value: a.value.to_string(),
        })
        .collect()
}

/// Detach `target` from its parent, if it has one.
fn detach(target: &Handle) {
    if let Some(parent) = target.parent.take().and_then(|weak| weak.upgrade()) {
        parent
            .children
            .borrow_mut()
            .retain(|c| !Rc::ptr_eq(c, target));
    }
}

/// Append text to `nodes[index - 1]` if it is a text node.
fn merge_text(children: &[Handle], index: usize, text: &str) -> bool {
    if let Some(prev) = index.checked_sub(1).and_then(|i| children.get(i))
        && let SinkData::Text(existing) = &prev.data
    {
        existing.borrow_mut().push_str(text);
        return true;
    }
    false
}

/// TreeSink implementation that builds a [`Document`].
///
/// Uses interior mutability because html5ever's TreeSink trait requires
/// methods to take `&self`.
pub(crate) struct RcSink {
    document: Handle,
}

impl Default for RcSink {
    fn default() -> Self {
        Self {
            document: SinkNode::new(SinkData::Document),
        }
    }
}

impl RcSink {
    fn insert_at(&self, parent: &Handle, index: usize, child: NodeOrText<Handle>) {
        match child {
            NodeOrText::AppendNode(node) => {
                detach(&node);
                let index = index.min(parent.children.borrow().len());
                node.parent.set(Some(Rc::downgrade(parent)));
                parent.children.borrow_mut().insert(index, node);
            }
            NodeOrText::AppendText(text) => {
                if merge_text(&parent.children.borrow(), index, &text) {
                    return;
                }
                let node = SinkNode::new(SinkData::Text(RefCell::new(text.to_string())));
                node.parent.set(Some(Rc::downgrade(parent)));
                parent.children.borrow_mut().insert(index, node);
            }
        }
    }
}

impl TreeSink for RcSink {
    type Handle = Handle;
    type Output = Document;
    type ElemName<'a>
        = &'a QualName
    where
        Self: 'a;

    fn finish(self) -> Document {
        Document {
            children: convert_children(&self.document),
        }
    }

    fn parse_error(&self, _msg: Cow<'static, str>) {
        // Lenient like browsers
    }

    fn get_document(&self) -> Handle {
        self.document.clone()
    }

    fn elem_name<'a>(&'a self, target: &'a Handle) -> Self::ElemName<'a> {
        static EMPTY: QualName = QualName {
            prefix: None,
            ns: html5ever::ns!(),
            local: html5ever::local_name!(""),
        };

        match &target.data {
            SinkData::Element { name, .. } => name,
            _ => &EMPTY,
        }
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<Html5Attribute>,
        _flags: ElementFlags,
    ) -> Handle {
        SinkNode::new(SinkData::Element {
            name,
            attrs: RefCell::new(convert_attrs(attrs)),
        })
    }

    fn create_comment(&self, text: StrTendril) -> Handle {
        SinkNode::new(SinkData::Comment(text.to_string()))
    }

    fn create_pi(&self, target: StrTendril, data: StrTendril) -> Handle {
        // Only reachable from the XML tree builder; keep the same
        // bogus-comment shape the HTML tokenizer produces for `<?...?>`
        SinkNode::new(SinkData::Comment(format!("?{target} {data}?")))
    }

    fn append(&self, parent: &Handle, child: NodeOrText<Handle>) {
        let len = parent.children.borrow().len();
        self.insert_at(parent, len, child);
    }

    fn append_based_on_parent_node(
        &self,
        element: &Handle,
        prev_element: &Handle,
        child: NodeOrText<Handle>,
    ) {
        if element.parent().is_some() {
            self.append_before_sibling(element, child);
        } else {
            self.append(prev_element, child);
        }
    }

    fn append_doctype_to_document(
        &self,
        name: StrTendril,
        public_id: StrTendril,
        system_id: StrTendril,
    ) {
        let doctype = SinkNode::new(SinkData::Doctype(Doctype {
            name: name.to_string(),
            public_id: public_id.to_string(),
            system_id: system_id.to_string(),
        }));
        self.append(&self.document, NodeOrText::AppendNode(doctype));
    }

    fn get_template_contents(&self, target: &Handle) -> Handle {
        // Template contents stay inline as ordinary children
        target.clone()
    }

    fn same_node(&self, x: &Handle, y: &Handle) -> bool {
        Rc::ptr_eq(x, y)
    }

    fn set_quirks_mode(&self, _mode: QuirksMode) {}

    fn append_before_sibling(&self, sibling: &Handle, new_node: NodeOrText<Handle>) {
        let Some(parent) = sibling.parent() else {
            return;
        };
        // Detach first so the index is computed after any removal
        if let NodeOrText::AppendNode(node) = &new_node {
            detach(node);
        }
        let index = parent
            .children
            .borrow()
            .iter()
            .position(|c| Rc::ptr_eq(c, sibling));
        if let Some(index) = index {
            self.insert_at(&parent, index, new_node);
        }
    }

    fn add_attrs_if_missing(&self, target: &Handle, attrs: Vec<Html5Attribute>) {
        if let SinkData::Element {
            attrs: existing, ..
        } = &target.data
        {
            let mut existing = existing.borrow_mut();
            for attr in convert_attrs(attrs) {
                if !existing.iter().any(|a| a.name == attr.name) {
                    existing.push(attr);
                }
            }
        }
    }

    fn remove_from_parent(&self, target: &Handle) {
        detach(target);
    }

    fn reparent_children(&self, node: &Handle, new_parent: &Handle) {
        let children = std::mem::take(&mut *node.children.borrow_mut());
        for child in &children {
            child.parent.set(Some(Rc::downgrade(new_parent)));
        }
        new_parent.children.borrow_mut().extend(children);
    }
}
