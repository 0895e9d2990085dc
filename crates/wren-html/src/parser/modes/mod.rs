//! [§ 13.2.6.4 The rules for parsing tokens in HTML content](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhtml)
//!
//! One file per group of insertion modes. Each adds handlers to
//! [`HTMLParser`](super::HTMLParser).

mod after;
mod body;
mod head;
mod select;
mod table;
mod template;
