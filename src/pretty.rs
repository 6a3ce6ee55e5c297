use crate::parser::node::Node;

/// Render a tree one node per line, children indented two spaces under
/// their parent. Images are quoted after the kind name.
pub fn dump_tree(root: &Node) -> String {
    let mut pp = TreePrinter::new();
    pp.emit(root);
    pp.buf
}

struct TreePrinter {
    buf: String,
    indent: usize,
}

impl TreePrinter {
    fn new() -> Self {
        Self {
            buf: String::new(),
            indent: 0,
        }
    }

    fn write(&mut self, s: &str) {
        self.buf.push_str(s);
    }

    fn newline(&mut self) {
        self.buf.push('\n');
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent {
            self.buf.push_str("  ");
        }
    }

    fn emit(&mut self, node: &Node) {
        if !self.buf.is_empty() {
            self.newline();
        }
        self.write_indent();
        self.write(node.kind.name());
        if let Some(image) = node.image() {
            self.write(" ");
            self.write(&format!("{image:?}"));
        }
        self.indent += 1;
        for child in &node.children {
            self.emit(child);
        }
        self.indent -= 1;
    }
}
