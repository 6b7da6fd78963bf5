//! Walking a parsed file's declarations and filing each one under its owner.

use std::collections::HashMap;

use log::trace;

use crate::aggregate;
use crate::attribute::attribute;
use crate::model::{Class, Method, Package, FREE_FUNCTIONS};
use crate::profile::Block;
use crate::syntax::{FuncDecl, SourceFile};

/// Display name of a declaration's owner: the receiver type with pointer
/// markers and surrounding whitespace removed, or [`FREE_FUNCTIONS`].
pub fn owner_name(source: &[u8], func: &FuncDecl) -> String {
    let Some(range) = &func.receiver else {
        return FREE_FUNCTIONS.to_string();
    };
    let text = String::from_utf8_lossy(source.get(range.clone()).unwrap_or_default());
    text.trim_start_matches('*').trim().to_string()
}

/// State for attributing one source file into its package. Classes are
/// looked up by owner name within this file only.
pub struct FileContext<'a> {
    file_name: &'a str,
    source: &'a [u8],
    blocks: &'a [Block],
    package: &'a mut Package,
    classes: HashMap<String, usize>,
}

impl<'a> FileContext<'a> {
    pub fn new(
        file_name: &'a str,
        source: &'a [u8],
        blocks: &'a [Block],
        package: &'a mut Package,
    ) -> Self {
        Self {
            file_name,
            source,
            blocks,
            package,
            classes: HashMap::new(),
        }
    }

    /// Attribute every function declaration in `file`, in source order.
    /// Returns the number of methods added.
    pub fn visit(mut self, file: &SourceFile) -> usize {
        for func in &file.funcs {
            self.func(func);
        }
        file.funcs.len()
    }

    fn func(&mut self, func: &FuncDecl) {
        let owner = owner_name(self.source, func);
        let lines = attribute(func.span, self.blocks);
        trace!(
            "{}: {}.{} [{}-{}] {} lines",
            self.file_name,
            owner,
            func.name,
            func.span.start,
            func.span.end,
            lines.len()
        );

        let idx = self.class_index(owner);
        aggregate::add_method(&mut self.package.classes[idx], Method::new(&func.name, lines));
    }

    fn class_index(&mut self, owner: String) -> usize {
        if let Some(&idx) = self.classes.get(&owner) {
            return idx;
        }
        let idx = self.package.classes.len();
        self.package
            .classes
            .push(Class::new(owner.clone(), self.file_name));
        self.classes.insert(owner, idx);
        idx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{parse_file, Position};

    const SHAPES: &str = "package shapes

type Foo struct{ n int }

func (f *Foo) Inc() {
\tf.n++
}

func (f Foo) Get() int {
\treturn f.n
}

func helper() int {
\treturn 1
}
";

    fn block(start: (u32, u32), end: (u32, u32), count: u64) -> Block {
        Block {
            start: Position::new(start.0, start.1),
            end: Position::new(end.0, end.1),
            num_stmt: 1,
            count,
        }
    }

    #[test]
    fn test_owner_names() {
        let src = "package p\n\
            func (s *Server) A() {}\n\
            func (Server) B() {}\n\
            func ( c * Client ) C() {}\n\
            func (t Tree[K]) D() {}\n\
            func E() {}\n";
        let file = parse_file("p.go", src.as_bytes()).unwrap();
        let owners: Vec<String> = file
            .funcs
            .iter()
            .map(|f| owner_name(src.as_bytes(), f))
            .collect();
        assert_eq!(owners, vec!["Server", "Server", "Client", "Tree[K]", "-"]);
    }

    #[test]
    fn test_methods_share_receiver_class() {
        let file = parse_file("shapes/foo.go", SHAPES.as_bytes()).unwrap();
        let blocks = [
            block((5, 21), (7, 2), 2),
            block((9, 24), (11, 2), 0),
            block((13, 20), (15, 2), 1),
        ];
        let mut package = Package::new("shapes");
        let count = FileContext::new("shapes/foo.go", SHAPES.as_bytes(), &blocks, &mut package)
            .visit(&file);

        assert_eq!(count, 3);
        assert_eq!(package.classes.len(), 2);

        let foo = &package.classes[0];
        assert_eq!(foo.name, "Foo");
        assert_eq!(foo.filename, "shapes/foo.go");
        let names: Vec<&str> = foo.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Inc", "Get"]);
        assert_eq!(foo.methods[0].line_rate, 1.0);
        assert_eq!(foo.methods[1].line_rate, 0.0);
        assert_eq!(foo.line_rate, 0.5);

        let free = &package.classes[1];
        assert_eq!(free.name, "-");
        assert_eq!(free.methods[0].name, "helper");
        assert_eq!(free.lines().count(), 3);
    }

    #[test]
    fn test_declaration_without_blocks() {
        let file = parse_file("shapes/foo.go", SHAPES.as_bytes()).unwrap();
        let mut package = Package::new("shapes");
        FileContext::new("shapes/foo.go", SHAPES.as_bytes(), &[], &mut package).visit(&file);

        for class in &package.classes {
            assert!(class.line_rate.is_nan());
            for method in &class.methods {
                assert!(method.lines.is_empty());
                assert!(method.line_rate.is_nan());
            }
        }
    }

    #[test]
    fn test_classes_are_scoped_per_file() {
        let a = "package p\nfunc (x X) A() {}\nfunc f() {}\n";
        let b = "package p\nfunc (x X) B() {}\nfunc g() {}\n";
        let mut package = Package::new("p");

        let file = parse_file("p/a.go", a.as_bytes()).unwrap();
        FileContext::new("p/a.go", a.as_bytes(), &[], &mut package).visit(&file);
        let file = parse_file("p/b.go", b.as_bytes()).unwrap();
        FileContext::new("p/b.go", b.as_bytes(), &[], &mut package).visit(&file);

        let classes: Vec<(&str, &str)> = package
            .classes
            .iter()
            .map(|c| (c.name.as_str(), c.filename.as_str()))
            .collect();
        assert_eq!(
            classes,
            vec![("X", "p/a.go"), ("-", "p/a.go"), ("X", "p/b.go"), ("-", "p/b.go")]
        );
    }
}
