//! ToC item types

use crate::index::NodeRef;

/// Structural element kinds represented in the outline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TocItemType {
    Body,
    Part,
    Title,
    Chapter,
    Section,
    Subsection,
    Article,
    Level,
    Citations,
    Citation,
    Recitals,
    Recital,
}

impl TocItemType {
    /// Type for an element tag; `None` for tags the outline ignores
    ///
    /// `body` is deliberately absent: it is the outline root, never an item.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "part" => Some(Self::Part),
            "title" => Some(Self::Title),
            "chapter" => Some(Self::Chapter),
            "section" => Some(Self::Section),
            "subsection" => Some(Self::Subsection),
            "article" => Some(Self::Article),
            "level" => Some(Self::Level),
            "citations" => Some(Self::Citations),
            "citation" => Some(Self::Citation),
            "recitals" => Some(Self::Recitals),
            "recital" => Some(Self::Recital),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Self::Body => "body",
            Self::Part => "part",
            Self::Title => "title",
            Self::Chapter => "chapter",
            Self::Section => "section",
            Self::Subsection => "subsection",
            Self::Article => "article",
            Self::Level => "level",
            Self::Citations => "citations",
            Self::Citation => "citation",
            Self::Recitals => "recitals",
            Self::Recital => "recital",
        }
    }

    /// Heading-bearing containers of other items
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            Self::Body
                | Self::Part
                | Self::Title
                | Self::Chapter
                | Self::Section
                | Self::Subsection
                | Self::Citations
                | Self::Recitals
        )
    }
}

/// One node of the outline
///
/// `source` points at the element the item was built from and is only
/// valid for the parse that produced it. An item without a source is new
/// and gets rendered from a template on reconstruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocItem {
    pub item_type: TocItemType,
    pub id: Option<String>,
    pub number: Option<String>,
    pub heading: Option<String>,
    pub children: Vec<TocItem>,
    pub source: Option<NodeRef>,
}

impl TocItem {
    /// A new item with no source element
    pub fn new(item_type: TocItemType) -> Self {
        Self {
            item_type,
            id: None,
            number: None,
            heading: None,
            children: Vec::new(),
            source: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_number(mut self, number: impl Into<String>) -> Self {
        self.number = Some(number.into());
        self
    }

    pub fn with_heading(mut self, heading: impl Into<String>) -> Self {
        self.heading = Some(heading.into());
        self
    }

    pub fn with_children(mut self, children: Vec<TocItem>) -> Self {
        self.children = children;
        self
    }

    #[inline]
    pub fn is_new(&self) -> bool {
        self.source.is_none()
    }

    /// Number of items in this subtree, this one included
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(TocItem::count).sum::<usize>()
    }

    /// Same outline shape and labels, ignoring source positions
    pub fn same_outline(&self, other: &TocItem) -> bool {
        self.item_type == other.item_type
            && self.id == other.id
            && self.number == other.number
            && self.heading == other.heading
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(&other.children)
                .all(|(a, b)| a.same_outline(b))
    }
}
