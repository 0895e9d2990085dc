//! [§ 13.2.4.3 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#the-stack-of-open-elements)

use wren_dom::{Atom, Namespace, NodeId, names};

use super::core::{HTMLParser, InsertionMode};

/// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-scope)
///
/// The element types that bound each kind of scope check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Scope {
    /// "has an element in scope"
    Default,
    /// "has an element in list item scope"
    ListItem,
    /// "has an element in button scope"
    Button,
    /// "has an element in table scope"
    Table,
    /// "has an element in select scope"
    Select,
}

/// [§ 13.2.4.3 Special](https://html.spec.whatwg.org/multipage/parsing.html#special)
///
/// "The following elements have varying levels of special parsing rules"
const SPECIAL_HTML_ELEMENTS: &[Atom] = &[
    names::ADDRESS,
    names::APPLET,
    names::AREA,
    names::ARTICLE,
    names::ASIDE,
    names::BASE,
    names::BASEFONT,
    names::BGSOUND,
    names::BLOCKQUOTE,
    names::BODY,
    names::BR,
    names::BUTTON,
    names::CAPTION,
    names::CENTER,
    names::COL,
    names::COLGROUP,
    names::DD,
    names::DETAILS,
    names::DIR,
    names::DIV,
    names::DL,
    names::DT,
    names::EMBED,
    names::FIELDSET,
    names::FIGCAPTION,
    names::FIGURE,
    names::FOOTER,
    names::FORM,
    names::FRAME,
    names::FRAMESET,
    names::H1,
    names::H2,
    names::H3,
    names::H4,
    names::H5,
    names::H6,
    names::HEAD,
    names::HEADER,
    names::HGROUP,
    names::HR,
    names::HTML,
    names::IFRAME,
    names::IMG,
    names::INPUT,
    names::KEYGEN,
    names::LI,
    names::LINK,
    names::LISTING,
    names::MAIN,
    names::MARQUEE,
    names::MENU,
    names::META,
    names::NAV,
    names::NOEMBED,
    names::NOFRAMES,
    names::NOSCRIPT,
    names::OBJECT,
    names::OL,
    names::P,
    names::PARAM,
    names::PLAINTEXT,
    names::PRE,
    names::SCRIPT,
    names::SEARCH,
    names::SECTION,
    names::SELECT,
    names::SOURCE,
    names::STYLE,
    names::SUMMARY,
    names::TABLE,
    names::TBODY,
    names::TD,
    names::TEMPLATE,
    names::TEXTAREA,
    names::TFOOT,
    names::TH,
    names::THEAD,
    names::TITLE,
    names::TR,
    names::TRACK,
    names::UL,
    names::WBR,
    names::XMP,
];

/// MathML text integration points, which are also special and bound every
/// scope.
const MATHML_BOUNDARIES: &[Atom] = &[
    names::MI,
    names::MO,
    names::MN,
    names::MS,
    names::MTEXT,
    names::ANNOTATION_XML,
];

/// SVG HTML integration points, special and scope-bounding like the MathML
/// set.
const SVG_BOUNDARIES: &[Atom] = &[names::FOREIGN_OBJECT, names::DESC, names::TITLE];

/// "has an element in scope": the HTML part of the default list.
const DEFAULT_SCOPE_HTML: &[Atom] = &[
    names::APPLET,
    names::CAPTION,
    names::HTML,
    names::TABLE,
    names::TD,
    names::TH,
    names::MARQUEE,
    names::OBJECT,
    names::TEMPLATE,
];

/// [§ 13.2.6.3 Closing elements that have implied end tags](https://html.spec.whatwg.org/multipage/parsing.html#generate-implied-end-tags)
///
/// "when the current node is a dd element, a dt element, an li element, an
/// optgroup element, an option element, a p element, an rb element, an rp
/// element, an rt element, or an rtc element"
const IMPLIED_END_TAGS: &[Atom] = &[
    names::DD,
    names::DT,
    names::LI,
    names::OPTGROUP,
    names::OPTION,
    names::P,
    names::RB,
    names::RP,
    names::RT,
    names::RTC,
];

/// "generate all implied end tags thoroughly"
const THOROUGH_IMPLIED_END_TAGS: &[Atom] = &[
    names::CAPTION,
    names::COLGROUP,
    names::DD,
    names::DT,
    names::LI,
    names::OPTGROUP,
    names::OPTION,
    names::P,
    names::RB,
    names::RP,
    names::RT,
    names::RTC,
    names::TBODY,
    names::TD,
    names::TFOOT,
    names::TH,
    names::THEAD,
    names::TR,
];

impl HTMLParser {
    /// Whether `id` is in the [special](https://html.spec.whatwg.org/multipage/parsing.html#special) category.
    pub(super) fn is_special_element(&self, id: NodeId) -> bool {
        let Some(element) = self.tree.as_element(id) else {
            return false;
        };
        let list = match element.namespace {
            Namespace::Html => SPECIAL_HTML_ELEMENTS,
            Namespace::MathMl => MATHML_BOUNDARIES,
            Namespace::Svg => SVG_BOUNDARIES,
        };
        list.contains(&element.name)
    }

    /// Whether `id` stops a scope search of kind `scope`.
    fn is_scope_boundary(&self, id: NodeId, scope: Scope) -> bool {
        let Some(element) = self.tree.as_element(id) else {
            return false;
        };
        let name = element.name;
        let html = element.namespace == Namespace::Html;

        // "has an element in select scope": all element types except
        // optgroup and option.
        if scope == Scope::Select {
            return !(html && (name == names::OPTGROUP || name == names::OPTION));
        }
        // "has an element in table scope": html, table, template.
        if scope == Scope::Table {
            return html && [names::HTML, names::TABLE, names::TEMPLATE].contains(&name);
        }

        let default = match element.namespace {
            Namespace::Html => DEFAULT_SCOPE_HTML.contains(&name),
            Namespace::MathMl => MATHML_BOUNDARIES.contains(&name),
            Namespace::Svg => SVG_BOUNDARIES.contains(&name),
        };
        default
            || match scope {
                Scope::ListItem => html && (name == names::OL || name == names::UL),
                Scope::Button => html && name == names::BUTTON,
                _ => false,
            }
    }

    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-the-specific-scope)
    ///
    /// "The stack of open elements is said to have a particular element in a
    /// specific scope consisting of a list of element types list when the
    /// following algorithm terminates in a match state"
    fn has_in_scope_where(&self, scope: Scope, matches: impl Fn(NodeId) -> bool) -> bool {
        // STEP 1: "Initialize node to be the current node (the bottommost node
        //          of the stack)."
        for &node in self.stack_of_open_elements.iter().rev() {
            // STEP 2: "If node is the target node, terminate in a match state."
            if matches(node) {
                return true;
            }
            // STEP 3: "Otherwise, if node is one of the element types in list,
            //          terminate in a failure state."
            if self.is_scope_boundary(node, scope) {
                return false;
            }
            // STEP 4: "Otherwise, set node to the previous entry in the stack of
            //          open elements and return to step 2."
        }
        false
    }

    /// Whether an HTML element named `name` is in `scope`.
    pub(super) fn has_element_in_scope_of(&self, name: &str, scope: Scope) -> bool {
        // A name this tree never interned cannot be on the stack.
        self.tree
            .atoms()
            .get(name)
            .is_some_and(|atom| self.has_atom_in_scope(atom, scope))
    }

    /// Whether an HTML element whose local name is `atom` is in `scope`.
    pub(super) fn has_atom_in_scope(&self, atom: Atom, scope: Scope) -> bool {
        self.has_in_scope_where(scope, |id| self.tree.is_html_atom(id, atom))
    }

    /// "has an element in scope"
    pub(super) fn has_element_in_scope(&self, name: &str) -> bool {
        self.has_element_in_scope_of(name, Scope::Default)
    }

    /// "has an element in button scope"
    pub(super) fn has_element_in_button_scope(&self, name: &str) -> bool {
        self.has_element_in_scope_of(name, Scope::Button)
    }

    /// "has an element in table scope"
    pub(super) fn has_element_in_table_scope(&self, name: &str) -> bool {
        self.has_element_in_scope_of(name, Scope::Table)
    }

    /// Whether any HTML element with one of `names` is in `scope`.
    pub(super) fn has_any_in_scope(&self, names: &[&str], scope: Scope) -> bool {
        let atoms = self.atoms_of(names);
        !atoms.is_empty()
            && self.has_in_scope_where(scope, |id| self.tree.is_html_atom_in(id, &atoms))
    }

    /// The atoms of whichever of `names` this tree has interned.
    fn atoms_of(&self, names: &[&str]) -> Vec<Atom> {
        names
            .iter()
            .filter_map(|name| self.tree.atoms().get(name))
            .collect()
    }

    /// Whether the specific node `target` is in default scope.
    pub(super) fn has_node_in_scope(&self, target: NodeId) -> bool {
        self.has_in_scope_where(Scope::Default, |id| id == target)
    }

    /// Whether `id` is on the stack of open elements.
    pub(super) fn is_open(&self, id: NodeId) -> bool {
        self.stack_of_open_elements.contains(&id)
    }

    /// Whether an HTML element named `name` is anywhere on the stack.
    pub(super) fn stack_contains(&self, name: &str) -> bool {
        self.tree.atoms().get(name).is_some_and(|atom| {
            self.stack_of_open_elements
                .iter()
                .any(|&id| self.tree.is_html_atom(id, atom))
        })
    }

    /// Pop elements until an HTML element named `name` has been popped.
    /// Empties the stack when there is no such element.
    pub(super) fn pop_until_named(&mut self, name: &str) {
        let atoms = self.atoms_of(&[name]);
        self.pop_until_atom_in(&atoms);
    }

    /// Pop elements until an HTML element with one of `names` has been popped.
    pub(super) fn pop_until_one_of(&mut self, names: &[&str]) {
        let atoms = self.atoms_of(names);
        self.pop_until_atom_in(&atoms);
    }

    /// Pop elements until an HTML element whose name is in `atoms` has been
    /// popped.
    fn pop_until_atom_in(&mut self, atoms: &[Atom]) {
        while let Some(id) = self.stack_of_open_elements.pop() {
            if self.tree.is_html_atom_in(id, atoms) {
                break;
            }
        }
    }

    /// Pop elements until `target` has been popped.
    pub(super) fn pop_until_node(&mut self, target: NodeId) {
        while let Some(id) = self.stack_of_open_elements.pop() {
            if id == target {
                break;
            }
        }
    }

    /// Remove `target` from the stack wherever it is.
    pub(super) fn remove_from_stack(&mut self, target: NodeId) {
        self.stack_of_open_elements.retain(|&id| id != target);
    }

    /// [§ 13.2.6.4.13](https://html.spec.whatwg.org/multipage/parsing.html#clear-the-stack-back-to-a-table-context)
    ///
    /// Pop until the current node is one of `names` or an `html` element.
    /// Covers "clear the stack back to a table context", "... table body
    /// context" and "... table row context".
    pub(super) fn clear_stack_back_to(&mut self, names: &[&str]) {
        let mut atoms = self.atoms_of(names);
        atoms.push(names::HTML);
        while let Some(id) = self.current_node() {
            if self.tree.is_html_atom_in(id, &atoms) {
                break;
            }
            let _ = self.stack_of_open_elements.pop();
        }
    }

    /// [§ 13.2.6.3 Closing elements that have implied end tags](https://html.spec.whatwg.org/multipage/parsing.html#generate-implied-end-tags)
    ///
    /// "while the current node is [one of the implied end tag elements], the
    /// UA must pop the current node off the stack of open elements."
    ///
    /// "If a step requires the UA to generate implied end tags but lists an
    /// element to exclude from the process, then the UA must perform the above
    /// steps as if that element was not in the above list."
    pub(super) fn generate_implied_end_tags(&mut self, except: Option<&str>) {
        let except = except.and_then(|name| self.tree.atoms().get(name));
        while let Some(id) = self.current_node() {
            let Some(element) = self.tree.as_element(id) else {
                break;
            };
            if element.namespace != Namespace::Html
                || !IMPLIED_END_TAGS.contains(&element.name)
                || except == Some(element.name)
            {
                break;
            }
            let _ = self.stack_of_open_elements.pop();
        }
    }

    /// "generate all implied end tags thoroughly"
    pub(super) fn generate_all_implied_end_tags_thoroughly(&mut self) {
        while let Some(id) = self.current_node() {
            if !self.tree.is_html_atom_in(id, THOROUGH_IMPLIED_END_TAGS) {
                break;
            }
            let _ = self.stack_of_open_elements.pop();
        }
    }

    /// [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#close-a-p-element)
    ///
    /// "When the steps above say the user agent is to close a p element, it
    /// means that the user agent must generate implied end tags, except for p
    /// elements. If the current node is not a p element, then this is a parse
    /// error. Pop elements from the stack of open elements until a p element
    /// has been popped from the stack."
    pub(super) fn close_p_element(&mut self) {
        self.generate_implied_end_tags(Some("p"));
        if !self
            .current_node()
            .is_some_and(|id| self.tree.is_html_atom(id, names::P))
        {
            self.parse_error("unclosed-element-before-p-end");
        }
        self.pop_until_atom_in(&[names::P]);
    }

    /// Close a `p` element if one is in button scope. Shared by most block
    /// start tags in the "in body" insertion mode.
    pub(super) fn close_p_if_in_button_scope(&mut self) {
        if self.has_atom_in_scope(names::P, Scope::Button) {
            self.close_p_element();
        }
    }

    /// [§ 13.2.4.1 Reset the insertion mode appropriately](https://html.spec.whatwg.org/multipage/parsing.html#reset-the-insertion-mode-appropriately)
    pub(super) fn reset_insertion_mode_appropriately(&mut self) {
        // STEP 1: "Let last be false."
        // STEP 2: "Let node be the last node in the stack of open elements."
        for index in (0..self.stack_of_open_elements.len()).rev() {
            let mut node = self.stack_of_open_elements[index];

            // STEP 3: "Loop: If node is the first node in the stack of open
            //          elements, then set last to true, and, if the parser was
            //          created as part of the HTML fragment parsing algorithm
            //          (fragment case), set node to the context element passed
            //          to that algorithm."
            let last = index == 0;
            if last && let Some(context) = self.context_element {
                node = context;
            }

            let Some(name) = self.html_name(node) else {
                if last {
                    break;
                }
                continue;
            };

            let mode = match name {
                // STEP 4: "If node is a select element, run these substeps"
                "select" => Some(self.select_insertion_mode(index, last)),
                // STEP 5: "If node is a td or th element and last is false"
                "td" | "th" if !last => Some(InsertionMode::InCell),
                // STEP 6-11
                "tr" => Some(InsertionMode::InRow),
                "tbody" | "thead" | "tfoot" => Some(InsertionMode::InTableBody),
                "caption" => Some(InsertionMode::InCaption),
                "colgroup" => Some(InsertionMode::InColumnGroup),
                "table" => Some(InsertionMode::InTable),
                // STEP 12: "If node is a template element, then switch the
                //           insertion mode to the current template insertion mode"
                "template" => Some(
                    self.template_insertion_modes
                        .last()
                        .copied()
                        .unwrap_or(InsertionMode::InTemplate),
                ),
                // STEP 13: "If node is a head element and last is false"
                "head" if !last => Some(InsertionMode::InHead),
                // STEP 14-15
                "body" => Some(InsertionMode::InBody),
                "frameset" => Some(InsertionMode::InFrameset),
                // STEP 16: "If node is an html element, run these substeps"
                "html" => Some(if self.head_element_pointer.is_none() {
                    InsertionMode::BeforeHead
                } else {
                    InsertionMode::AfterHead
                }),
                _ => None,
            };

            if let Some(mode) = mode {
                self.insertion_mode = mode;
                return;
            }
            // STEP 17: "If last is true, then switch the insertion mode to
            //           "in body" and return."
            if last {
                break;
            }
        }
        self.insertion_mode = InsertionMode::InBody;
    }

    /// STEP 4 of resetting the insertion mode, for a `select` at `index`.
    fn select_insertion_mode(&self, index: usize, last: bool) -> InsertionMode {
        // STEP 4.1: "If last is true, jump to the step below labeled done."
        if !last {
            // STEP 4.2-4.6: walk up through the ancestors; a template ends the
            // search, a table means "in select in table".
            for &ancestor in self.stack_of_open_elements[..index].iter().rev() {
                if self.tree.is_html_atom(ancestor, names::TEMPLATE) {
                    break;
                }
                if self.tree.is_html_atom(ancestor, names::TABLE) {
                    return InsertionMode::InSelectInTable;
                }
            }
        }
        // STEP 4.7: "Done: Switch the insertion mode to "in select" and return."
        InsertionMode::InSelect
    }
}
