//! [§ 13.2.6.1 Creating and inserting nodes](https://html.spec.whatwg.org/multipage/parsing.html#creating-and-inserting-nodes)

use wren_dom::{ArenaError, Namespace, NodeData, NodeId};

use super::core::HTMLParser;
use super::foreign_content::{adjust_mathml_attribute_name, adjust_svg_attribute_name};
use crate::tokenizer::{Attribute, TokenizerState};

/// An insertion point: append to `parent`, or insert before `before` when set.
pub(super) type InsertionPoint = (NodeId, Option<NodeId>);

impl HTMLParser {
    /// [§ 13.2.4.3 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#current-node)
    ///
    /// "The current node is the bottommost node in this stack of open elements."
    pub(super) fn current_node(&self) -> Option<NodeId> {
        self.stack_of_open_elements.last().copied()
    }

    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#adjusted-current-node)
    ///
    /// "The adjusted current node is the context element if the parser was
    /// created as part of the HTML fragment parsing algorithm and the stack of
    /// open elements has only one element in it; otherwise, the adjusted
    /// current node is the current node."
    pub(super) fn adjusted_current_node(&self) -> Option<NodeId> {
        if self.stack_of_open_elements.len() == 1
            && let Some(context) = self.context_element
        {
            return Some(context);
        }
        self.current_node()
    }

    /// The local name of `id` if it is an HTML element.
    pub(super) fn html_name(&self, id: NodeId) -> Option<&str> {
        self.tree
            .as_element(id)
            .filter(|e| e.namespace == Namespace::Html)
            .map(|e| self.tree.resolve(e.name))
    }

    /// Whether `id` is an HTML element with one of `names`.
    pub(super) fn is_html_one_of(&self, id: NodeId, names: &[&str]) -> bool {
        self.html_name(id).is_some_and(|n| names.contains(&n))
    }

    /// Whether the current node is an HTML element named `name`.
    pub(super) fn current_node_is(&self, name: &str) -> bool {
        self.current_node()
            .is_some_and(|id| self.tree.is_html_element(id, name))
    }

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#appropriate-place-for-inserting-a-node)
    ///
    /// "The appropriate place for inserting a node, optionally using a
    /// particular override target, is the position in an element returned by
    /// running the following steps"
    pub(super) fn appropriate_place_for_inserting(
        &self,
        override_target: Option<NodeId>,
    ) -> InsertionPoint {
        // STEP 1: "If there was an override target specified, then let target
        //          be the override target. Otherwise, let target be the current node."
        let target = override_target
            .or_else(|| self.current_node())
            .unwrap_or(NodeId::ROOT);

        // STEP 2: "If foster parenting is enabled and target is a table,
        //          tbody, tfoot, thead, or tr element"
        if self.foster_parenting
            && self.is_html_one_of(target, &["table", "tbody", "tfoot", "thead", "tr"])
        {
            return self.foster_parent_location();
        }

        // "Otherwise: Let adjusted insertion location be inside target, after
        //  its last child (if any)."
        //
        // Template contents are stored as the template's own children, so
        // the "template contents" redirect of STEP 3 needs no extra work.
        (target, None)
    }

    /// [§ 13.2.6.1 Foster parenting](https://html.spec.whatwg.org/multipage/parsing.html#foster-parent)
    fn foster_parent_location(&self) -> InsertionPoint {
        // STEP 2.1: "Let last template be the last template element in the
        //            stack of open elements, if any."
        let last_template = self
            .stack_of_open_elements
            .iter()
            .rposition(|&id| self.tree.is_html_element(id, "template"));

        // STEP 2.2: "Let last table be the last table element in the stack of
        //            open elements, if any."
        let last_table = self
            .stack_of_open_elements
            .iter()
            .rposition(|&id| self.tree.is_html_element(id, "table"));

        // STEP 2.3: "If there is a last template and either there is no last
        //            table, or there is one, but last template is lower (more
        //            recently added) than last table in the stack of open
        //            elements, then: let adjusted insertion location be inside
        //            last template's template contents, after its last child"
        if let Some(template_pos) = last_template
            && last_table.is_none_or(|table_pos| template_pos > table_pos)
        {
            return (self.stack_of_open_elements[template_pos], None);
        }

        // STEP 2.4: "If there is no last table, then let adjusted insertion
        //            location be inside the first element in the stack of open
        //            elements (the html element), after its last child"
        let Some(table_pos) = last_table else {
            let first = self
                .stack_of_open_elements
                .first()
                .copied()
                .unwrap_or(NodeId::ROOT);
            return (first, None);
        };
        let table_id = self.stack_of_open_elements[table_pos];

        // STEP 2.5: "If last table has a parent node, then let adjusted
        //            insertion location be inside last table's parent node,
        //            immediately before last table, and abort these steps."
        if let Some(parent_id) = self.tree.parent(table_id) {
            return (parent_id, Some(table_id));
        }

        // STEP 2.6-2.7: "Let previous element be the element immediately above
        //                last table in the stack of open elements. Let adjusted
        //                insertion location be inside previous element, after
        //                its last child"
        let previous = table_pos
            .checked_sub(1)
            .map_or(NodeId::ROOT, |pos| self.stack_of_open_elements[pos]);
        (previous, None)
    }

    /// Put `node` at `place`.
    pub(super) fn insert_at(&mut self, place: InsertionPoint, node: NodeId) {
        let (parent, before) = place;
        self.tree.insert_before(parent, node, before);
    }

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#create-an-element-for-the-token)
    ///
    /// "Create an element for a token" in `namespace`. Attribute names are
    /// case-adjusted for SVG and MathML; "xlink:", "xml:" and "xmlns" prefixes
    /// stay part of the attribute name.
    pub(super) fn create_element_for_token(
        &mut self,
        name: &str,
        attributes: &[Attribute],
        namespace: Namespace,
    ) -> Result<NodeId, ArenaError> {
        let adjust: fn(&str) -> &str = match namespace {
            Namespace::Html => unadjusted,
            Namespace::Svg => adjust_svg_attribute_name,
            Namespace::MathMl => adjust_mathml_attribute_name,
        };
        let location = self.node_location();
        self.tree.new_element(
            name,
            namespace,
            attributes
                .iter()
                .map(|a| (adjust(a.name.as_str()), a.value.as_str())),
            location,
        )
    }

    /// [§ 13.2.6.1 Insert a foreign element](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-foreign-element)
    ///
    /// "Let adjusted insertion location be the appropriate place for inserting
    /// a node. Let element be the result of creating an element for the token
    /// ... insert element at the adjusted insertion location. Push element
    /// onto the stack of open elements so that it is the new current node."
    pub(super) fn insert_foreign_element(
        &mut self,
        name: &str,
        attributes: &[Attribute],
        namespace: Namespace,
    ) -> Result<NodeId, ArenaError> {
        let place = self.appropriate_place_for_inserting(None);
        let element = self.create_element_for_token(name, attributes, namespace)?;
        // A Document accepts a single element child.
        if place.0 != NodeId::ROOT || self.tree.document_element().is_none() {
            self.insert_at(place, element);
        }
        self.stack_of_open_elements.push(element);
        Ok(element)
    }

    /// [§ 13.2.6.1 Insert an HTML element](https://html.spec.whatwg.org/multipage/parsing.html#insert-an-html-element)
    ///
    /// "When the steps below require the user agent to insert an HTML element
    /// for a token, the user agent must insert a foreign element for the token,
    /// in the HTML namespace."
    pub(super) fn insert_html_element(
        &mut self,
        name: &str,
        attributes: &[Attribute],
    ) -> Result<NodeId, ArenaError> {
        self.insert_foreign_element(name, attributes, Namespace::Html)
    }

    /// [§ 13.2.6.1 Insert a character](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-character)
    ///
    /// "When the steps below require the user agent to insert a character
    /// while processing a token, the user agent must run the following steps..."
    pub(super) fn insert_character(&mut self, c: char) -> Result<(), ArenaError> {
        // STEP 2: "Let the adjusted insertion location be the appropriate place
        //         for inserting a node."
        let (parent, before) = self.appropriate_place_for_inserting(None);

        // STEP 3: "If the adjusted insertion location is inside a Document
        //         node, then ignore the token."
        if parent == NodeId::ROOT {
            return Ok(());
        }

        // STEP 4: "If there is a Text node immediately before the adjusted
        //         insertion location, then append data to that Text node's data."
        let previous = match before {
            Some(reference) => self.tree.prev_sibling(reference),
            None => self.tree.last_child(parent),
        };
        if let Some(text) = previous
            && self.tree.as_text(text).is_some()
        {
            let mut buf = [0; 4];
            self.tree.append_text(text, c.encode_utf8(&mut buf));
            return Ok(());
        }

        // "Otherwise, create a new Text node whose data is data ... and insert
        //  the newly created node at the adjusted insertion location."
        let location = self.node_location();
        let text = self.tree.new_node(NodeData::Text(c.to_string()), location)?;
        self.insert_at((parent, before), text);
        Ok(())
    }

    /// [§ 13.2.6.1 Insert a comment](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-comment)
    ///
    /// "When the steps below require the user agent to insert a comment
    /// while processing a comment token, optionally with an explicitly
    /// insertion position position..."
    pub(super) fn insert_comment(
        &mut self,
        data: &str,
        position: Option<InsertionPoint>,
    ) -> Result<(), ArenaError> {
        // STEP 2: "If position was specified, then let the adjusted insertion
        //         location be position. Otherwise, let adjusted insertion
        //         location be the appropriate place for inserting a node."
        let place = position.unwrap_or_else(|| self.appropriate_place_for_inserting(None));
        // STEP 3: "Create a Comment node whose data attribute is set to data"
        let location = self.node_location();
        let comment = self
            .tree
            .new_node(NodeData::Comment(data.to_string()), location)?;
        // STEP 4: "Insert the newly created node at the adjusted insertion location."
        self.insert_at(place, comment);
        Ok(())
    }

    /// Insert a comment as the last child of the Document node.
    pub(super) fn insert_comment_in_document(&mut self, data: &str) -> Result<(), ArenaError> {
        self.insert_comment(data, Some((NodeId::ROOT, None)))
    }

    /// [§ 13.2.6.2 Parsing elements that contain only text](https://html.spec.whatwg.org/multipage/parsing.html#generic-raw-text-element-parsing-algorithm)
    ///
    /// "Insert an HTML element for the token. If the algorithm that was
    /// invoked is the generic raw text element parsing algorithm, switch the
    /// tokenizer to the RAWTEXT state; otherwise the algorithm invoked was
    /// the generic RCDATA element parsing algorithm, switch the tokenizer to
    /// the RCDATA state. Let the original insertion mode be the current
    /// insertion mode. Then, switch the insertion mode to "text"."
    pub(super) fn parse_text_element(
        &mut self,
        name: &str,
        attributes: &[Attribute],
        state: TokenizerState,
    ) -> Result<(), ArenaError> {
        let _ = self.insert_html_element(name, attributes)?;
        self.tokenizer.set_state(state);
        self.original_insertion_mode = self.insertion_mode;
        self.insertion_mode = super::InsertionMode::Text;
        Ok(())
    }
}

const fn unadjusted(name: &str) -> &str {
    name
}
