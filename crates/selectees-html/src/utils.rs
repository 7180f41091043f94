use kuchikikiki::{Attribute, ExpandedName, NodeRef};
use markup5ever::{LocalName, QualName, ns};
use regex::Regex;

/// Returns a regex that will never match anything.
///
/// Fallback for static patterns that fail to compile.
#[must_use]
pub fn never_matching_regex() -> Regex {
  #[allow(
    clippy::expect_used,
    reason = "This pattern is guaranteed to be valid"
  )]
  Regex::new(r"[^\s\S]").expect("regex pattern [^\\s\\S] should always compile")
}

/// Compile one of the crate's static patterns, logging and falling back to
/// [`never_matching_regex`] on failure.
pub(crate) fn compile_static(name: &str, pattern: &str) -> Regex {
  Regex::new(pattern).unwrap_or_else(|e| {
    log::error!("Failed to compile {name} regex: {e}");
    never_matching_regex()
  })
}

/// Collect every node in `root` (inclusive) matching a CSS selector.
///
/// The selectors used by this crate are literals, so a parse failure yields an
/// empty list rather than an error.
pub(crate) fn select_all(root: &NodeRef, selector: &str) -> Vec<NodeRef> {
  root
    .select(selector)
    .map(|matches| matches.map(|m| m.as_node().clone()).collect())
    .unwrap_or_default()
}

/// Build an HTML element with the given attributes.
pub(crate) fn new_element(tag: &str, attrs: &[(&str, &str)]) -> NodeRef {
  NodeRef::new_element(
    QualName::new(None, ns!(html), LocalName::from(tag)),
    attrs.iter().map(|(name, value)| {
      (ExpandedName::new("", *name), Attribute {
        prefix: None,
        value:  (*value).to_string(),
      })
    }),
  )
}

/// Read an attribute off an element node.
pub(crate) fn attr(node: &NodeRef, name: &str) -> Option<String> {
  node
    .as_element()
    .and_then(|el| el.attributes.borrow().get(name).map(str::to_string))
}

/// Set an attribute on an element node. Non-element nodes are left untouched.
pub(crate) fn set_attr(node: &NodeRef, name: &str, value: String) {
  if let Some(el) = node.as_element() {
    el.attributes.borrow_mut().insert(name, value);
  }
}

/// Tag name of an element node, if it is one.
pub(crate) fn tag_name(node: &NodeRef) -> Option<String> {
  node.as_element().map(|el| el.name.local.to_string())
}

/// Whether an element carries `class` as one of its class tokens.
pub(crate) fn has_class(node: &NodeRef, class: &str) -> bool {
  attr(node, "class")
    .is_some_and(|value| value.split_ascii_whitespace().any(|c| c == class))
}

/// Add a class token to an element, keeping the ones it already has.
pub(crate) fn add_class(node: &NodeRef, class: &str) {
  let classes = match attr(node, "class") {
    Some(existing) if !existing.trim().is_empty() => {
      format!("{} {class}", existing.trim())
    },
    _ => class.to_string(),
  };
  set_attr(node, "class", classes);
}

/// Replace an element with its children.
pub(crate) fn unwrap_node(node: &NodeRef) {
  let children: Vec<NodeRef> = node.children().collect();
  for child in children {
    node.insert_before(child);
  }
  node.detach();
}
