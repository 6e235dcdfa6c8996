//! Category discovery over the live tree.

use limen_stage_core::{NodeId, SelectorSet, Stage};

use crate::category::Category;
use crate::prepare::PreparedSet;

/// One discovery pass over `scope`: each catalog category paired with its
/// fresh matches, in document order. Nodes already prepared are skipped, so
/// repeated passes over the same view are cheap no-ops.
pub fn discover(
    stage: &Stage,
    catalog: &[(Category, SelectorSet)],
    prepared: &PreparedSet,
    scope: NodeId,
) -> Vec<(Category, Vec<NodeId>)> {
    let mut out = Vec::new();
    for (category, set) in catalog {
        let fresh: Vec<NodeId> = set
            .select_from(stage, scope)
            .into_iter()
            .filter(|id| !prepared.contains(*id))
            .collect();
        if !fresh.is_empty() {
            out.push((*category, fresh));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::compile_catalog;

    fn heading_page(stage: &mut Stage) -> (NodeId, NodeId, NodeId) {
        let root = stage.root();
        let main = stage.create_with(root, "main", &["page-wrapper"]).unwrap();

        let hero = stage
            .create_with(main, "section", &["section", "hero"])
            .unwrap();
        let hero_block = stage.create_with(hero, "div", &["text-block"]).unwrap();
        let hero_heading = stage
            .create_with(hero_block, "h1", &["heading"])
            .unwrap();

        let body = stage.create_with(main, "section", &["section"]).unwrap();
        let block = stage.create_with(body, "div", &["text-block"]).unwrap();
        let heading = stage.create_with(block, "h2", &["heading"]).unwrap();

        (main, hero_heading, heading)
    }

    #[test]
    fn exclusions_keep_hero_headings_out() {
        let mut stage = Stage::new();
        let (main, hero_heading, heading) = heading_page(&mut stage);
        let catalog = compile_catalog().unwrap();
        let prepared = PreparedSet::new();

        let found = discover(&stage, &catalog, &prepared, main);
        let headings = found
            .iter()
            .find(|(c, _)| *c == Category::Heading)
            .map(|(_, ids)| ids.clone())
            .unwrap();
        assert_eq!(headings, vec![heading]);
        assert!(!headings.contains(&hero_heading));
    }

    #[test]
    fn prepared_members_are_not_rediscovered() {
        let mut stage = Stage::new();
        let (main, _, heading) = heading_page(&mut stage);
        let catalog = compile_catalog().unwrap();
        let mut prepared = PreparedSet::new();
        prepared.mark(heading);

        let found = discover(&stage, &catalog, &prepared, main);
        assert!(found.iter().all(|(c, _)| *c != Category::Heading));
    }
}
