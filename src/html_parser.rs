use html5ever::serialize::{serialize, SerializeOpts};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{parse_document, Attribute};
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};

use crate::error::{MirrorError, Result};

/// Kind of asset an element references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Image,
    Stylesheet,
    Script,
}

impl AssetKind {
    /// Scan order used when collecting references.
    pub const ALL: [AssetKind; 3] = [AssetKind::Image, AssetKind::Stylesheet, AssetKind::Script];

    /// Name of the attribute holding the asset URL.
    pub fn attribute(self) -> &'static str {
        match self {
            AssetKind::Image | AssetKind::Script => "src",
            AssetKind::Stylesheet => "href",
        }
    }

    fn tag(self) -> &'static str {
        match self {
            AssetKind::Image => "img",
            AssetKind::Stylesheet => "link",
            AssetKind::Script => "script",
        }
    }

    fn matches(self, tag: &str, attrs: &[Attribute]) -> bool {
        if tag != self.tag() {
            return false;
        }
        match self {
            AssetKind::Stylesheet => attr_value(attrs, "rel")
                .map(|rel| {
                    rel.split_ascii_whitespace()
                        .any(|token| token.eq_ignore_ascii_case("stylesheet"))
                })
                .unwrap_or(false),
            AssetKind::Image | AssetKind::Script => true,
        }
    }
}

/// An asset-bearing element found in a document.
#[derive(Clone)]
pub struct AssetReference {
    pub kind: AssetKind,
    /// Attribute value as written in the markup.
    pub value: String,
    node: Handle,
}

impl std::fmt::Debug for AssetReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetReference")
            .field("kind", &self.kind)
            .field("value", &self.value)
            .finish()
    }
}

/// A parsed, mutable HTML document.
pub struct HtmlDocument {
    dom: RcDom,
}

impl HtmlDocument {
    pub fn parse(html: &str) -> Self {
        let dom = parse_document(RcDom::default(), Default::default()).one(html);
        Self { dom }
    }

    /// Collects every image, stylesheet link and external script with a
    /// non-empty reference attribute, images first, then stylesheets, then
    /// scripts, each group in document order.
    pub fn asset_references(&self) -> Vec<AssetReference> {
        let mut references = Vec::new();
        for kind in AssetKind::ALL {
            walk(&self.dom.document, &mut |node: &Handle| {
                if let NodeData::Element { name, attrs, .. } = &node.data {
                    let attrs = attrs.borrow();
                    if !kind.matches(&name.local, &attrs) {
                        return;
                    }
                    if let Some(value) = attr_value(&attrs, kind.attribute()) {
                        if !value.trim().is_empty() {
                            references.push(AssetReference {
                                kind,
                                value: value.to_string(),
                                node: node.clone(),
                            });
                        }
                    }
                }
            });
        }
        references
    }

    /// Replaces the reference attribute of the element behind `reference`.
    pub fn rewrite(&mut self, reference: &AssetReference, value: &str) {
        if let NodeData::Element { attrs, .. } = &reference.node.data {
            let mut attrs = attrs.borrow_mut();
            if let Some(attr) = attrs
                .iter_mut()
                .find(|attr| &*attr.name.local == reference.kind.attribute())
            {
                attr.value = StrTendril::from_slice(value);
            }
        }
    }

    /// Number of elements with the given tag name.
    pub fn count_elements(&self, tag: &str) -> usize {
        let mut count = 0;
        walk(&self.dom.document, &mut |node: &Handle| {
            if let NodeData::Element { name, .. } = &node.data {
                if &*name.local == tag {
                    count += 1;
                }
            }
        });
        count
    }

    pub fn serialize(&self) -> Result<String> {
        let document: SerializableHandle = self.dom.document.clone().into();
        let mut bytes = Vec::new();
        serialize(&mut bytes, &document, SerializeOpts::default()).map_err(MirrorError::Serialize)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

fn attr_value<'a>(attrs: &'a [Attribute], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|attr| &*attr.name.local == name)
        .map(|attr| &*attr.value)
}

fn walk(node: &Handle, visit: &mut impl FnMut(&Handle)) {
    visit(node);
    for child in node.children.borrow().iter() {
        walk(child, visit);
    }
}
