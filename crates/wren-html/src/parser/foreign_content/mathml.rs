//! MathML foreign content support.
//!
//! [§ 13.2.6.3](https://html.spec.whatwg.org/multipage/parsing.html#creating-and-inserting-nodes)

/// [§ 13.2.6.3 Adjust MathML attributes](https://html.spec.whatwg.org/multipage/parsing.html#adjust-mathml-attributes)
///
/// "When the steps below require the user agent to adjust MathML attributes for
/// a token, then, if the attribute's name is 'definitionurl', set the
/// attribute's name to 'definitionURL'."
#[must_use]
pub fn adjust_mathml_attribute_name(name: &str) -> &str {
    if name == "definitionurl" {
        "definitionURL"
    } else {
        name
    }
}

/// [§ 13.2.6.1 MathML text integration point](https://html.spec.whatwg.org/multipage/parsing.html#mathml-text-integration-point)
///
/// "A node is a MathML text integration point if it is one of the following
/// elements: A MathML mi element, A MathML mo element, A MathML mn element,
/// A MathML ms element, A MathML mtext element"
#[must_use]
pub fn is_mathml_text_integration_point_name(name: &str) -> bool {
    matches!(name, "mi" | "mo" | "mn" | "ms" | "mtext")
}
