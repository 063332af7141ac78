// Mon Jan 19 2026 - Alex

use crate::structure::resolver::BaseClassMap;
use crate::structure::types::TypeId;
use indexmap::IndexMap;
use std::fmt;

/// Shape of the recovered inheritance graph, reported after a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HierarchyStats {
    pub total_classes: usize,
    pub root_classes: usize,
    pub leaf_classes: usize,
    pub max_depth: usize,
    pub avg_depth: f64,
    pub multiple_inheritance_count: usize,
}

impl HierarchyStats {
    pub fn from_bases(bases: &BaseClassMap) -> Self {
        let total_classes = bases.len();
        if total_classes == 0 {
            return Self::default();
        }

        let mut children: IndexMap<TypeId, Vec<TypeId>> = IndexMap::new();
        for (class, parents) in bases {
            for parent in parents {
                children.entry(*parent).or_default().push(*class);
            }
        }

        let roots: Vec<TypeId> = bases
            .iter()
            .filter(|(_, parents)| parents.is_empty())
            .map(|(class, _)| *class)
            .collect();
        let leaf_classes = bases.keys().filter(|class| !children.contains_key(*class)).count();
        let multiple_inheritance_count = bases.values().filter(|parents| parents.len() > 1).count();

        let mut depths: IndexMap<TypeId, Depth> = IndexMap::new();
        let mut cyclic = false;
        for class in bases.keys() {
            cyclic |= depth_of(bases, *class, &mut depths);
        }
        if cyclic {
            log::warn!("inheritance graph has a cycle; depth statistics are partial");
        }
        let depths: Vec<usize> = depths
            .values()
            .filter_map(|depth| match depth {
                Depth::Known(depth) => Some(*depth),
                Depth::Visiting => None,
            })
            .collect();

        let max_depth = depths.iter().copied().max().unwrap_or(0);
        let avg_depth = depths.iter().map(|depth| *depth as f64).sum::<f64>() / total_classes as f64;

        Self {
            total_classes,
            root_classes: roots.len(),
            leaf_classes,
            max_depth,
            avg_depth,
            multiple_inheritance_count,
        }
    }
}

impl fmt::Display for HierarchyStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Hierarchy Statistics:")?;
        writeln!(f, "  Total classes: {}", self.total_classes)?;
        writeln!(f, "  Root classes: {}", self.root_classes)?;
        writeln!(f, "  Leaf classes: {}", self.leaf_classes)?;
        writeln!(f, "  Max depth: {}", self.max_depth)?;
        writeln!(f, "  Average depth: {:.2}", self.avg_depth)?;
        writeln!(f, "  Multiple inheritance: {}", self.multiple_inheritance_count)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum Depth {
    Visiting,
    Known(usize),
}

/// Longest base-class chain above `class`, memoized in `depths`. Returns
/// true when a cycle was found below `class`; the edge closing it counts
/// as zero.
fn depth_of(bases: &BaseClassMap, class: TypeId, depths: &mut IndexMap<TypeId, Depth>) -> bool {
    match depths.get(&class) {
        Some(Depth::Known(_)) => return false,
        Some(Depth::Visiting) => return true,
        None => {}
    }
    depths.insert(class, Depth::Visiting);

    let mut cyclic = false;
    let mut depth = 0;
    for parent in bases.get(&class).into_iter().flatten() {
        cyclic |= depth_of(bases, *parent, depths);
        if let Some(Depth::Known(parent_depth)) = depths.get(parent) {
            depth = depth.max(parent_depth + 1);
        }
    }
    depths.insert(class, Depth::Known(depth));
    cyclic
}
