//! Per-tree interning of tag and attribute names.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ArenaError;

/// Opaque handle for an interned name.
///
/// An `Atom` is only meaningful together with the [`AtomTable`] that produced
/// it. Two atoms from the same table are equal exactly when their names are.
/// The [`names`] constants are the exception: they mean the same name in
/// every table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Atom(pub u32);

macro_rules! local_names {
    ($($konst:ident => $name:literal,)*) => {
        /// Names the tree builder compares against on every scope check.
        ///
        /// Every [`AtomTable`] interns these first, in this order, so the
        /// constants are valid atoms for any table.
        pub mod names {
            use super::Atom;

            #[allow(non_camel_case_types, clippy::upper_case_acronyms)]
            #[repr(u32)]
            enum Index {
                $($konst,)*
            }

            $(
                #[doc = concat!("`", $name, "`")]
                pub const $konst: Atom = Atom(Index::$konst as u32);
            )*

            /// The names above, indexed by atom.
            pub const ALL: &[&str] = &[$($name,)*];
        }
    };
}

local_names! {
    ADDRESS => "address",
    ANNOTATION_XML => "annotation-xml",
    APPLET => "applet",
    AREA => "area",
    ARTICLE => "article",
    ASIDE => "aside",
    BASE => "base",
    BASEFONT => "basefont",
    BGSOUND => "bgsound",
    BLOCKQUOTE => "blockquote",
    BODY => "body",
    BR => "br",
    BUTTON => "button",
    CAPTION => "caption",
    CENTER => "center",
    COL => "col",
    COLGROUP => "colgroup",
    DD => "dd",
    DESC => "desc",
    DETAILS => "details",
    DIR => "dir",
    DIV => "div",
    DL => "dl",
    DT => "dt",
    EMBED => "embed",
    FIELDSET => "fieldset",
    FIGCAPTION => "figcaption",
    FIGURE => "figure",
    FOOTER => "footer",
    FOREIGN_OBJECT => "foreignObject",
    FORM => "form",
    FRAME => "frame",
    FRAMESET => "frameset",
    H1 => "h1",
    H2 => "h2",
    H3 => "h3",
    H4 => "h4",
    H5 => "h5",
    H6 => "h6",
    HEAD => "head",
    HEADER => "header",
    HGROUP => "hgroup",
    HR => "hr",
    HTML => "html",
    IFRAME => "iframe",
    IMG => "img",
    INPUT => "input",
    KEYGEN => "keygen",
    LI => "li",
    LINK => "link",
    LISTING => "listing",
    MAIN => "main",
    MARQUEE => "marquee",
    MENU => "menu",
    META => "meta",
    MI => "mi",
    MN => "mn",
    MO => "mo",
    MS => "ms",
    MTEXT => "mtext",
    NAV => "nav",
    NOEMBED => "noembed",
    NOFRAMES => "noframes",
    NOSCRIPT => "noscript",
    OBJECT => "object",
    OL => "ol",
    OPTGROUP => "optgroup",
    OPTION => "option",
    P => "p",
    PARAM => "param",
    PLAINTEXT => "plaintext",
    PRE => "pre",
    RB => "rb",
    RP => "rp",
    RT => "rt",
    RTC => "rtc",
    SCRIPT => "script",
    SEARCH => "search",
    SECTION => "section",
    SELECT => "select",
    SOURCE => "source",
    STYLE => "style",
    SUMMARY => "summary",
    TABLE => "table",
    TBODY => "tbody",
    TD => "td",
    TEMPLATE => "template",
    TEXTAREA => "textarea",
    TFOOT => "tfoot",
    TH => "th",
    THEAD => "thead",
    TITLE => "title",
    TR => "tr",
    TRACK => "track",
    UL => "ul",
    WBR => "wbr",
    XMP => "xmp",
}

/// Name interner owned by a single [`DomTree`](crate::DomTree).
///
/// Every parse builds its own table, so independent parses never share
/// mutable state. The [`names`] are always present.
#[derive(Debug, Clone)]
pub struct AtomTable {
    atoms: Vec<Arc<str>>,
    map: HashMap<Arc<str>, Atom>,
}

impl Default for AtomTable {
    fn default() -> Self {
        let mut table = Self {
            atoms: Vec::with_capacity(names::ALL.len()),
            map: HashMap::with_capacity(names::ALL.len()),
        };
        for name in names::ALL {
            let _ = table.intern(name);
        }
        table
    }
}

impl AtomTable {
    /// Create a table holding only the [`names`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `name` exactly as given.
    ///
    /// HTML names arrive already lowercased from the tokenizer; adjusted
    /// SVG names such as `foreignObject` keep their case.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::AtomTableFull`] when no identifier is left.
    pub fn intern(&mut self, name: &str) -> Result<Atom, ArenaError> {
        if let Some(&atom) = self.map.get(name) {
            return Ok(atom);
        }

        let index: u32 = self
            .atoms
            .len()
            .try_into()
            .map_err(|_| ArenaError::AtomTableFull)?;
        let atom = Atom(index);
        let stored: Arc<str> = Arc::from(name);
        self.atoms.push(Arc::clone(&stored));
        let _ = self.map.insert(stored, atom);
        Ok(atom)
    }

    /// Intern `name` after ASCII-lowercasing it.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::AtomTableFull`] when no identifier is left.
    pub fn intern_ascii_folded(&mut self, name: &str) -> Result<Atom, ArenaError> {
        if name.bytes().any(|b| b.is_ascii_uppercase()) {
            self.intern(&name.to_ascii_lowercase())
        } else {
            self.intern(name)
        }
    }

    /// Look up an already-interned name without inserting it.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Atom> {
        self.map.get(name).copied()
    }

    /// The name behind `atom`, or `""` for an atom from another table.
    #[must_use]
    pub fn resolve(&self, atom: Atom) -> &str {
        self.atoms.get(atom.0 as usize).map_or("", AsRef::as_ref)
    }

    /// Number of distinct names interned so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    /// Whether the table holds no names at all. Never true for a table
    /// built by [`AtomTable::new`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }
}
