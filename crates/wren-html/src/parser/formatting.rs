//! [§ 13.2.4.3 The list of active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#the-list-of-active-formatting-elements)
//! and [§ 13.2.6.4.7 The adoption agency algorithm](https://html.spec.whatwg.org/multipage/parsing.html#adoption-agency-algorithm).

use wren_dom::{ArenaError, NodeId};

use super::core::{ActiveFormattingElement, HTMLParser};

/// "If outer loop counter is greater than or equal to 8, then return."
const ADOPTION_AGENCY_OUTER_LIMIT: usize = 8;

/// Noah's Ark clause: "If there are already three elements in the list of
/// active formatting elements after the last marker ... that have the same
/// tag name, namespace, and attributes as element, then remove the earliest
/// such element from the list"
const NOAHS_ARK_LIMIT: usize = 3;

/// What the caller of the adoption agency algorithm must do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum AdoptionOutcome {
    /// The end tag was dealt with.
    Done,
    /// "act as described in the "any other end tag" entry"
    AnyOtherEndTag,
}

impl HTMLParser {
    /// Position of `id` in the list of active formatting elements.
    pub(super) fn afl_position(&self, id: NodeId) -> Option<usize> {
        self.active_formatting_elements
            .iter()
            .position(|e| *e == ActiveFormattingElement::Element(id))
    }

    /// Whether two elements have "the same tag name, namespace, and
    /// attributes". Attribute order does not matter.
    fn same_formatting_element(&self, a: NodeId, b: NodeId) -> bool {
        let (Some(a), Some(b)) = (self.tree.as_element(a), self.tree.as_element(b)) else {
            return false;
        };
        a.name == b.name
            && a.namespace == b.namespace
            && a.attrs.len() == b.attrs.len()
            && a.attrs.iter().all(|attr| {
                b.attrs
                    .iter()
                    .any(|other| other.name == attr.name && other.value == attr.value)
            })
    }

    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#push-onto-the-list-of-active-formatting-elements)
    ///
    /// "When the steps below require the UA to push onto the list of active
    /// formatting elements an element element, the UA must perform the
    /// following steps"
    pub(super) fn push_active_formatting_element(&mut self, element: NodeId) {
        // STEP 1: Noah's Ark clause. Entries after the last marker that match
        // element, oldest first.
        let matching: Vec<usize> = self
            .active_formatting_elements
            .iter()
            .enumerate()
            .rev()
            .take_while(|(_, e)| **e != ActiveFormattingElement::Marker)
            .filter_map(|(i, e)| match *e {
                ActiveFormattingElement::Element(id)
                    if self.same_formatting_element(id, element) =>
                {
                    Some(i)
                }
                _ => None,
            })
            .collect();
        if matching.len() >= NOAHS_ARK_LIMIT
            && let Some(&earliest) = matching.last()
        {
            let _ = self.active_formatting_elements.remove(earliest);
        }

        // STEP 2: "Add element to the list of active formatting elements."
        self.active_formatting_elements
            .push(ActiveFormattingElement::Element(element));
    }

    /// Push a marker onto the list of active formatting elements.
    pub(super) fn push_marker(&mut self) {
        self.active_formatting_elements
            .push(ActiveFormattingElement::Marker);
    }

    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#clear-the-list-of-active-formatting-elements-up-to-the-last-marker)
    ///
    /// "When the steps below require the UA to clear the list of active
    /// formatting elements up to the last marker, the UA must perform the
    /// following steps: Let entry be the last (most recently added) entry in
    /// the list of active formatting elements. Remove entry from the list of
    /// active formatting elements. If entry was a marker, then stop the
    /// algorithm at this point. Otherwise, go to step 1."
    pub(super) fn clear_active_formatting_elements_to_last_marker(&mut self) {
        while let Some(entry) = self.active_formatting_elements.pop() {
            if entry == ActiveFormattingElement::Marker {
                break;
            }
        }
    }

    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#reconstruct-the-active-formatting-elements)
    ///
    /// "When the steps below require the UA to reconstruct the active
    /// formatting elements, the UA must perform the following steps"
    pub(super) fn reconstruct_active_formatting_elements(&mut self) -> Result<(), ArenaError> {
        // STEP 1: "If there are no entries in the list of active formatting
        //          elements, then there is nothing to reconstruct; stop."
        // STEP 2: "If the last (most recently added) entry in the list of
        //          active formatting elements is a marker, or if it is an
        //          element that is in the stack of open elements, then there
        //          is nothing to reconstruct; stop."
        let needs_reconstruction = |entry: &ActiveFormattingElement| match *entry {
            ActiveFormattingElement::Marker => false,
            ActiveFormattingElement::Element(id) => !self.is_open(id),
        };
        let Some(last) = self.active_formatting_elements.last() else {
            return Ok(());
        };
        if !needs_reconstruction(last) {
            return Ok(());
        }

        // STEP 3-6 ("Rewind"): walk back to the entry after the last one that
        // is a marker or open.
        let mut index = self.active_formatting_elements.len() - 1;
        while index > 0 && needs_reconstruction(&self.active_formatting_elements[index - 1]) {
            index -= 1;
        }

        // STEP 7-10 ("Advance" / "Create"): for each remaining entry, insert
        // a clone and replace the entry with it.
        for i in index..self.active_formatting_elements.len() {
            let ActiveFormattingElement::Element(entry) = self.active_formatting_elements[i] else {
                continue;
            };
            // STEP 8: "Create: Insert an HTML element for the token for which
            //          the element entry was created, to obtain new element."
            let new_element = self.tree.clone_node(entry)?;
            let place = self.appropriate_place_for_inserting(None);
            self.insert_at(place, new_element);
            self.stack_of_open_elements.push(new_element);

            // STEP 9: "Replace the entry for entry in the list with an entry
            //          for new element."
            self.active_formatting_elements[i] = ActiveFormattingElement::Element(new_element);
        }
        Ok(())
    }

    /// [§ 13.2.6.4.7 The adoption agency algorithm](https://html.spec.whatwg.org/multipage/parsing.html#adoption-agency-algorithm)
    ///
    /// Fixes up mis-nested formatting end tags such as `<b><i></b></i>`.
    /// The outer loop runs at most eight times.
    pub(super) fn run_adoption_agency(&mut self, subject: &str) -> Result<AdoptionOutcome, ArenaError> {
        // STEP 2: "If the current node is an HTML element whose tag name is
        //          subject, and the current node is not in the list of active
        //          formatting elements, then pop the current node off the stack
        //          of open elements and return."
        if let Some(current) = self.current_node()
            && self.tree.is_html_element(current, subject)
            && self.afl_position(current).is_none()
        {
            let _ = self.stack_of_open_elements.pop();
            return Ok(AdoptionOutcome::Done);
        }

        // STEP 3-5: "Let outer loop counter be 0. Outer loop: If outer loop
        //            counter is greater than or equal to 8, then return."
        for _ in 0..ADOPTION_AGENCY_OUTER_LIMIT {
            // STEP 7: "Let formatting element be the last element in the list
            //          of active formatting elements that: is between the end
            //          of the list and the last marker in the list, if any, or
            //          the start of the list otherwise, and has the tag name
            //          subject."
            let mut formatting = None;
            for (i, entry) in self.active_formatting_elements.iter().enumerate().rev() {
                match *entry {
                    ActiveFormattingElement::Marker => break,
                    ActiveFormattingElement::Element(id) => {
                        if self.tree.is_html_element(id, subject) {
                            formatting = Some((i, id));
                            break;
                        }
                    }
                }
            }

            // "If there is no such element, then return and instead act as
            //  described in the "any other end tag" entry above."
            let Some((formatting_afl_index, formatting_element)) = formatting else {
                return Ok(AdoptionOutcome::AnyOtherEndTag);
            };

            // STEP 8: "If formatting element is not in the stack of open
            //          elements, then this is a parse error; remove the element
            //          from the list, and return."
            let Some(formatting_stack_index) = self
                .stack_of_open_elements
                .iter()
                .position(|&id| id == formatting_element)
            else {
                self.parse_error_for("formatting-element-not-open", subject);
                let _ = self.active_formatting_elements.remove(formatting_afl_index);
                return Ok(AdoptionOutcome::Done);
            };

            // STEP 9: "If formatting element is in the stack of open elements,
            //          but the element is not in scope, then this is a parse
            //          error; return."
            if !self.has_node_in_scope(formatting_element) {
                self.parse_error_for("formatting-element-not-in-scope", subject);
                return Ok(AdoptionOutcome::Done);
            }

            // STEP 10: "If formatting element is not the current node, this is a
            //           parse error. (But do not return.)"
            if self.current_node() != Some(formatting_element) {
                self.parse_error_for("misnested-formatting-element", subject);
            }

            // STEP 11: "Let furthest block be the topmost node in the stack of
            //           open elements that is lower in the stack than formatting
            //           element, and is an element in the special category."
            let furthest_block = self.stack_of_open_elements[formatting_stack_index + 1..]
                .iter()
                .copied()
                .find(|&id| self.is_special_element(id));

            // STEP 12: "If there is no furthest block, then the UA must first
            //           pop all the nodes from the bottom of the stack of open
            //           elements, from the current node up to and including
            //           formatting element, then remove formatting element from
            //           the list of active formatting elements, and finally return."
            let Some(furthest_block) = furthest_block else {
                self.stack_of_open_elements.truncate(formatting_stack_index);
                let _ = self.active_formatting_elements.remove(formatting_afl_index);
                return Ok(AdoptionOutcome::Done);
            };

            // STEP 13: "Let common ancestor be the element immediately above
            //           formatting element in the stack of open elements."
            let Some(common_ancestor) = formatting_stack_index
                .checked_sub(1)
                .map(|i| self.stack_of_open_elements[i])
            else {
                return Ok(AdoptionOutcome::Done);
            };

            // STEP 14: "Let a bookmark note the position of formatting element
            //           in the list of active formatting elements relative to
            //           the elements on either side of it in the list."
            let mut bookmark = formatting_afl_index;

            // STEP 15: "Let node and last node be furthest block."
            let mut node_index = self
                .stack_of_open_elements
                .iter()
                .position(|&id| id == furthest_block)
                .unwrap_or(formatting_stack_index + 1);
            let mut last_node = furthest_block;

            // STEP 16: "Let inner loop counter be 0."
            let mut inner_loop_counter = 0;

            // STEP 17: "Inner loop:"
            loop {
                // STEP 17.1: "Increment inner loop counter by 1."
                inner_loop_counter += 1;

                // STEP 17.2: "Let node be the element immediately above node in
                //             the stack of open elements, or if node is no longer
                //             in the stack of open elements (e.g. because it got
                //             removed by this algorithm), the element that was
                //             immediately above node in the stack of open elements
                //             before node was removed."
                node_index -= 1;
                let node = self.stack_of_open_elements[node_index];

                // STEP 17.3: "If node is formatting element, then break."
                if node == formatting_element {
                    break;
                }

                // STEP 17.4: "If inner loop counter is greater than 3 and node is
                //             in the list of active formatting elements, then
                //             remove node from the list of active formatting
                //             elements."
                if inner_loop_counter > 3
                    && let Some(afl_index) = self.afl_position(node)
                {
                    let _ = self.active_formatting_elements.remove(afl_index);
                    if bookmark > afl_index {
                        bookmark -= 1;
                    }
                }

                // STEP 17.5: "If node is not in the list of active formatting
                //             elements, then remove node from the stack of open
                //             elements and continue."
                let Some(node_afl_index) = self.afl_position(node) else {
                    let _ = self.stack_of_open_elements.remove(node_index);
                    continue;
                };

                // STEP 17.6: "Create an element for the token for which the
                //             element node was created, in the HTML namespace,
                //             with common ancestor as the intended parent; replace
                //             the entry for node in the list of active formatting
                //             elements with an entry for the new element, replace
                //             the entry for node in the stack of open elements with
                //             an entry for the new element, and let node be the new
                //             element."
                let new_node = self.tree.clone_node(node)?;
                self.active_formatting_elements[node_afl_index] =
                    ActiveFormattingElement::Element(new_node);
                self.stack_of_open_elements[node_index] = new_node;

                // STEP 17.7: "If last node is furthest block, then move the
                //             aforementioned bookmark to be immediately after the
                //             new node in the list of active formatting elements."
                if last_node == furthest_block {
                    bookmark = node_afl_index + 1;
                }

                // STEP 17.8: "Append last node to node."
                self.tree.append_child(new_node, last_node);

                // STEP 17.9: "Set last node to node."
                last_node = new_node;
            }

            // STEP 18: "Insert whatever last node ended up being in the previous
            //           step at the appropriate place for inserting a node, but
            //           using common ancestor as the override target."
            let place = self.appropriate_place_for_inserting(Some(common_ancestor));
            self.insert_at(place, last_node);

            // STEP 19: "Create an element for the token for which formatting
            //           element was created, in the HTML namespace, with furthest
            //           block as the intended parent."
            let new_element = self.tree.clone_node(formatting_element)?;

            // STEP 20: "Take all of the child nodes of furthest block and append
            //           them to the element created in the last step."
            self.tree.move_children(furthest_block, new_element);

            // STEP 21: "Append that new element to furthest block."
            self.tree.append_child(furthest_block, new_element);

            // STEP 22: "Remove formatting element from the list of active
            //           formatting elements, and insert the new element into the
            //           list of active formatting elements at the position of the
            //           aforementioned bookmark."
            if let Some(old_index) = self.afl_position(formatting_element) {
                let _ = self.active_formatting_elements.remove(old_index);
                if bookmark > old_index {
                    bookmark -= 1;
                }
            }
            let bookmark = bookmark.min(self.active_formatting_elements.len());
            self.active_formatting_elements
                .insert(bookmark, ActiveFormattingElement::Element(new_element));

            // STEP 23: "Remove formatting element from the stack of open
            //           elements, and insert the new element into the stack of
            //           open elements immediately below the position of furthest
            //           block in that stack."
            self.remove_from_stack(formatting_element);
            if let Some(position) = self
                .stack_of_open_elements
                .iter()
                .position(|&id| id == furthest_block)
            {
                self.stack_of_open_elements.insert(position + 1, new_element);
            }
        }

        Ok(AdoptionOutcome::Done)
    }
}
