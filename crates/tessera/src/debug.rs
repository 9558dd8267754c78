//! Component tree visualization.
//!
//! ```
//! use std::sync::Arc;
//! use tessera::debug::ComponentTreeDebug;
//! use tessera::{ComponentGroup, HolderType, ListComponent};
//!
//! let root = ComponentGroup::new();
//! let rows = ListComponent::<(), u32>::new(HolderType::of::<()>()).with_data([1, 2, 3]);
//! root.add_component(Arc::new(rows)).unwrap();
//!
//! println!("{}", ComponentTreeDebug::new().display(&root));
//! ```

use std::fmt;

use tessera_core::{TreeFormatOptions, TreeStyle};

use crate::component::Component;
use crate::range_list::Range;

/// Renders a component tree as indented text, one node per line.
#[derive(Debug, Clone, Default)]
pub struct ComponentTreeDebug {
    options: TreeFormatOptions,
}

impl ComponentTreeDebug {
    /// Create a visualizer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a visualizer with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format the tree rooted at `root`.
    pub fn format_tree(&self, root: &dyn Component) -> String {
        self.display(root).to_string()
    }

    /// A `Display` adapter rendering the tree rooted at `root`.
    pub fn display<'a>(&'a self, root: &'a dyn Component) -> TreeDisplay<'a> {
        TreeDisplay { debug: self, root }
    }

    fn write_node(
        &self,
        f: &mut fmt::Formatter<'_>,
        component: &dyn Component,
        range: Range,
        ancestors_last: &mut Vec<bool>,
    ) -> fmt::Result {
        if self.options.max_depth.is_some_and(|max| ancestors_last.len() > max) {
            return Ok(());
        }

        self.write_prefix(f, ancestors_last)?;
        let is_group = component.as_group().is_some();
        if self.options.show_types || !is_group {
            f.write_str(short_type_name(component.type_name()))?;
        } else {
            f.write_str("group")?;
        }
        if self.options.show_ranges {
            write!(f, " {range}")?;
        }
        if self.options.show_lanes {
            match component.number_lanes() {
                Ok(lanes) => write!(f, " lanes={lanes}")?,
                Err(error) => write!(f, " lanes=<{error}>")?,
            }
        }
        writeln!(f)?;

        let Some(group) = component.as_group() else {
            return Ok(());
        };
        let children = group.ranged_components();
        let last = children.len().saturating_sub(1);
        for (i, child) in children.iter().enumerate() {
            ancestors_last.push(i == last);
            let result = self.write_node(
                f,
                &*child.value,
                child.range.offset(range.lower),
                ancestors_last,
            );
            ancestors_last.pop();
            result?;
        }
        Ok(())
    }

    fn write_prefix(&self, f: &mut fmt::Formatter<'_>, ancestors_last: &[bool]) -> fmt::Result {
        let Some((&is_last, parents)) = ancestors_last.split_last() else {
            return Ok(());
        };
        let (continuation, tee, corner) = self.options.style.glyphs();
        let width = self.options.indent_size.max(tee.chars().count()) + 1;

        for &parent_is_last in parents {
            if parent_is_last || self.options.style == TreeStyle::Compact {
                write!(f, "{:width$}", "")?;
            } else {
                let pad = width - continuation.chars().count();
                write!(f, "{continuation}{:pad$}", "")?;
            }
        }
        let connector = if is_last { corner } else { tee };
        write!(f, "{connector} ")
    }
}

/// Display adapter returned by [`ComponentTreeDebug::display`].
pub struct TreeDisplay<'a> {
    debug: &'a ComponentTreeDebug,
    root: &'a dyn Component,
}

impl fmt::Display for TreeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let range = Range::with_size(0, self.root.count());
        self.debug.write_node(f, self.root, range, &mut Vec::new())
    }
}

/// `a::b::Name<c::D>` becomes `Name`.
fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
