use crate::{tag_name::TagName, tag_processor::ParsingNamespace};

/// An element which has been opened and not yet closed.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct OpenElement {
    pub tag_name: TagName,
    pub namespace: ParsingNamespace,
}

impl OpenElement {
    pub fn new(tag_name: TagName, namespace: ParsingNamespace) -> Self {
        Self {
            tag_name,
            namespace,
        }
    }

    /// Namespace in which the element's children are parsed.
    ///
    /// SVG and MathML subtrees stay foreign except inside the HTML
    /// integration points, which switch back to HTML.
    ///
    /// @see https://html.spec.whatwg.org/#html-integration-point
    /// @see https://html.spec.whatwg.org/#mathml-text-integration-point
    pub fn children_namespace(&self) -> ParsingNamespace {
        match (&self.namespace, &self.tag_name) {
            (ParsingNamespace::Svg, TagName::FOREIGNOBJECT | TagName::DESC | TagName::TITLE) => {
                ParsingNamespace::Html
            }
            (
                ParsingNamespace::MathML,
                TagName::MI | TagName::MO | TagName::MN | TagName::MS | TagName::MTEXT,
            ) => ParsingNamespace::Html,
            (namespace, _) => *namespace,
        }
    }
}

/// Ancestor path of the token the tokenizer is paused on.
///
/// Unlike the stack of open elements in a full HTML parser this one
/// knows nothing about implied end tags or misnested formatting
/// elements: openers push, and a closer pops back to the nearest
/// element of the same name.
///
/// > Initially, the stack of open elements is empty. The stack grows
/// > downwards; the topmost node on the stack is the first one added
/// > to the stack, and the bottommost node of the stack is the most
/// > recently added node in the stack.
///
/// @see https://html.spec.whatwg.org/#stack-of-open-elements
#[derive(Debug, Default, Clone)]
pub struct StackOfOpenElements {
    stack: Vec<OpenElement>,
}

impl StackOfOpenElements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, element: OpenElement) {
        log::trace!(target: "markup_api::stack", "push {}", element.tag_name);
        self.stack.push(element);
    }

    pub fn pop(&mut self) -> Option<OpenElement> {
        let popped = self.stack.pop();
        if let Some(element) = &popped {
            log::trace!(target: "markup_api::stack", "pop {}", element.tag_name);
        }
        popped
    }

    /// Pops elements until one named `tag_name` has been popped.
    ///
    /// Returns the matching element, or `None`, leaving the stack
    /// untouched, when no such element is open.
    pub fn pop_until(&mut self, tag_name: &TagName) -> Option<OpenElement> {
        let position = self
            .stack
            .iter()
            .rposition(|element| element.tag_name == *tag_name)?;

        for implicitly_closed in self.stack.drain(position + 1..).rev() {
            log::trace!(
                target: "markup_api::stack",
                "implicitly close {} on </{}>",
                implicitly_closed.tag_name,
                tag_name
            );
        }

        self.pop()
    }

    pub fn current_node(&self) -> Option<&OpenElement> {
        self.stack.last()
    }

    pub fn count(&self) -> usize {
        self.stack.len()
    }

    pub fn contains(&self, tag_name: &TagName) -> bool {
        self.stack.iter().any(|element| element.tag_name == *tag_name)
    }

    /// Steps through the stack of open elements, starting with the top element
    /// (added first) and walking downwards to the one added last.
    ///
    /// Example:
    ///
    /// ```text
    /// <em><strong><a>We are here
    /// walk_down() -> EM -> STRONG -> A
    /// ```
    pub fn walk_down(&self) -> impl DoubleEndedIterator<Item = &OpenElement> {
        self.stack.iter()
    }

    /// Steps through the stack of open elements, starting with the bottom element
    /// (added last) and walking upwards to the one added first.
    ///
    /// Example:
    ///
    /// ```text
    /// <em><strong><a>We are here
    /// walk_up() -> A -> STRONG -> EM
    /// ```
    pub fn walk_up(&self) -> impl Iterator<Item = &OpenElement> {
        self.stack.iter().rev()
    }

    /// Element names from the root to the most recently opened element.
    pub fn breadcrumbs(&self) -> Vec<&str> {
        self.walk_down().map(|element| element.tag_name.as_str()).collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn html(name: &str) -> OpenElement {
        OpenElement::new(TagName::from_html(name.as_bytes()), ParsingNamespace::Html)
    }

    #[test]
    fn closers_pop_through_their_element() {
        let mut stack = StackOfOpenElements::new();
        stack.push(html("div"));
        stack.push(html("p"));
        stack.push(html("em"));

        assert_eq!(stack.pop_until(&TagName::from_html(b"p")), Some(html("p")));
        assert_eq!(stack.breadcrumbs(), vec!["div"]);
    }

    #[test]
    fn unmatched_closers_are_ignored() {
        let mut stack = StackOfOpenElements::new();
        stack.push(html("div"));

        assert_eq!(stack.pop_until(&TagName::from_html(b"span")), None);
        assert_eq!(stack.count(), 1);
    }

    #[test]
    fn walks_both_directions() {
        let mut stack = StackOfOpenElements::new();
        stack.push(html("em"));
        stack.push(html("strong"));
        stack.push(html("a"));

        let down: Vec<_> = stack.walk_down().map(|e| e.tag_name.as_str()).collect();
        let up: Vec<_> = stack.walk_up().map(|e| e.tag_name.as_str()).collect();
        assert_eq!(down, vec!["em", "strong", "a"]);
        assert_eq!(up, vec!["a", "strong", "em"]);
        assert_eq!(stack.current_node(), Some(&html("a")));
        assert!(stack.contains(&TagName::from_html(b"STRONG")));
    }

    #[test]
    fn integration_points_switch_back_to_html() {
        let svg = OpenElement::new(TagName::SVG, ParsingNamespace::Svg);
        let foreign_object = OpenElement::new(TagName::FOREIGNOBJECT, ParsingNamespace::Svg);
        let mtext = OpenElement::new(TagName::MTEXT, ParsingNamespace::MathML);
        assert_eq!(svg.children_namespace(), ParsingNamespace::Svg);
        assert_eq!(foreign_object.children_namespace(), ParsingNamespace::Html);
        assert_eq!(mtext.children_namespace(), ParsingNamespace::Html);
    }
}
