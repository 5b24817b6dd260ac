//! # Scenario Tier Tests (T0-T4)
//!
//! If ANY tier fails, the substrate is INVALID.
//!
//! ## Tiers
//! - T0: Value Integrity
//! - T1: AtomSpace Structure
//! - T2: PLN Inference & ECAN
//! - T3: Cogfluence Units & Workflows
//! - T4: Encoding, Transduction & Snapshots

use cogweave_core::{
    AtomId, AtomSpace, AtomSpaceConfig, AtomType, AttentionValue, CapacityKind, CogError,
    CogfluenceConfig, CogfluenceStore, TruthValue, UnitId, UnitType,
};

// =============================================================================
// TIER T0: VALUE INTEGRITY
// =============================================================================

mod t0_value_integrity {
    use super::*;
    use cogweave_core::{PlnRule, combine_confidence};

    /// T0.1: Fresh atoms carry the default truth value.
    #[test]
    fn fresh_atom_has_default_truth() {
        let mut space = AtomSpace::default();
        let id = space.add_node(AtomType::Concept, "cat").expect("node");

        let tv = space.truth_value(id).expect("live");
        assert!((tv.strength() - 0.8).abs() < 1e-6);
        assert!((tv.confidence() - 0.9).abs() < 1e-6);
        assert_eq!(tv.count(), 1);
    }

    /// T0.2: Out-of-range and NaN components are clamped.
    #[test]
    fn components_are_clamped() {
        let tv = TruthValue::new(1.7, f32::NAN, 3);
        assert!((tv.strength() - 1.0).abs() < 1e-6);
        assert!(tv.confidence() >= 0.0 && tv.confidence() <= 1.0);

        let av = AttentionValue::new(5.0, -1.0, 2.0);
        assert!((av.sti() - 1.0).abs() < 1e-6);
        assert_eq!(av.lti(), 0.0);
        assert!((av.vlti() - 1.0).abs() < 1e-6);
    }

    /// T0.3: Confidence combination tolerates two zero inputs.
    #[test]
    fn confidence_combination_handles_zero() {
        assert_eq!(combine_confidence(0.0, 0.0), 0.0);
        let c = combine_confidence(0.9, 0.9);
        assert!(c > 0.0 && c < 0.9);
    }

    /// T0.4: Implication follows `1 - s_a + s_a * s_b`.
    #[test]
    fn implication_strength() {
        let a = TruthValue::new(0.5, 0.9, 1);
        let b = TruthValue::new(0.4, 0.9, 1);
        let out = PlnRule::Implication.apply(&a, &b);
        assert!((out.strength() - 0.7).abs() < 1e-6);
    }
}

// =============================================================================
// TIER T1: ATOMSPACE STRUCTURE
// =============================================================================

mod t1_atomspace_structure {
    use super::*;

    /// T1.1: Links register themselves as incoming on every target.
    #[test]
    fn link_updates_incoming_sets() {
        let mut space = AtomSpace::default();
        let cat = space.add_node(AtomType::Concept, "cat").expect("cat");
        let animal = space.add_node(AtomType::Concept, "animal").expect("animal");
        let link = space
            .add_link(AtomType::Inheritance, &[cat, animal])
            .expect("link");

        assert_eq!(space.query_incoming(cat), vec![link]);
        assert_eq!(space.query_incoming(animal), vec![link]);
        assert_eq!(space.query_outgoing(link), vec![cat, animal]);
        assert_eq!(space.get(link).expect("link").name(), "link_3");
    }

    /// T1.2: Empty and dangling links are rejected without side effects.
    #[test]
    fn invalid_links_rejected() {
        let mut space = AtomSpace::default();
        let cat = space.add_node(AtomType::Concept, "cat").expect("cat");

        assert!(matches!(
            space.add_link(AtomType::Member, &[]),
            Err(CogError::InvalidLink(_))
        ));
        assert!(matches!(
            space.add_link(AtomType::Member, &[cat, AtomId(99)]),
            Err(CogError::InvalidLink(_))
        ));
        assert_eq!(space.len(), 1);
        assert!(space.query_incoming(cat).is_empty());
    }

    /// T1.3: Deleted atoms vanish from queries but keep their id.
    #[test]
    fn delete_tombstones() {
        let mut space = AtomSpace::default();
        let a = space.add_node(AtomType::Concept, "a").expect("a");
        let b = space.add_node(AtomType::Concept, "a").expect("b");
        space.delete(a).expect("delete");

        assert!(!space.contains(a));
        assert_eq!(space.query_by_name("a"), vec![b]);
        assert_eq!(space.len(), 2);
        assert_eq!(space.live_count(), 1);
        assert!(matches!(space.delete(a), Err(CogError::AtomNotFound(_))));
        assert!(matches!(
            space.add_link(AtomType::Member, &[a, b]),
            Err(CogError::InvalidLink(_))
        ));
    }

    /// T1.4: The atom limit is enforced.
    #[test]
    fn capacity_enforced() {
        let config = AtomSpaceConfig {
            max_atoms: 2,
            ..AtomSpaceConfig::default()
        };
        let mut space = AtomSpace::new(&config);
        let a = space.add_node(AtomType::Concept, "a").expect("a");
        let _b = space.add_node(AtomType::Concept, "b").expect("b");

        let err = space.add_link(AtomType::Member, &[a]).expect_err("full");
        assert!(matches!(
            err,
            CogError::CapacityExceeded {
                kind: CapacityKind::Atoms,
                limit: 2
            }
        ));
    }

    /// T1.5: Long names are truncated on a character boundary.
    #[test]
    fn long_names_truncated() {
        let mut space = AtomSpace::default();
        let name = "é".repeat(200);
        let id = space.add_node(AtomType::Concept, &name).expect("node");
        let stored = space.get(id).expect("atom").name();
        assert!(stored.len() <= 255);
        assert!(name.starts_with(stored));
    }

    /// T1.6: Deleting a link leaves its id in the targets' incoming lists.
    #[test]
    fn deleted_link_stays_incoming() {
        let mut space = AtomSpace::default();
        let cat = space.add_node(AtomType::Concept, "cat").expect("cat");
        let animal = space.add_node(AtomType::Concept, "animal").expect("animal");
        let link = space
            .add_link(AtomType::Inheritance, &[cat, animal])
            .expect("link");

        space.delete(link).expect("delete");

        assert!(!space.contains(link));
        assert_eq!(space.query_incoming(cat), vec![link]);
        assert_eq!(space.query_incoming(animal), vec![link]);
        assert!(space.query_outgoing(link).is_empty());
        assert!(space.query_by_type(AtomType::Inheritance).is_empty());
    }
}

// =============================================================================
// TIER T2: PLN INFERENCE & ECAN
// =============================================================================

mod t2_inference_and_attention {
    use super::*;

    fn taxonomy() -> (AtomSpace, AtomId, AtomId, AtomId) {
        let mut space = AtomSpace::default();
        let human = space.add_node(AtomType::Concept, "Human").expect("human");
        let mammal = space.add_node(AtomType::Concept, "Mammal").expect("mammal");
        let animal = space.add_node(AtomType::Concept, "Animal").expect("animal");
        let hm = space
            .add_link(AtomType::Inheritance, &[human, mammal])
            .expect("hm");
        let ma = space
            .add_link(AtomType::Inheritance, &[mammal, animal])
            .expect("ma");
        space
            .set_truth_value(hm, TruthValue::new(0.9, 0.9, 1))
            .expect("tv");
        space
            .set_truth_value(ma, TruthValue::new(0.85, 0.9, 1))
            .expect("tv");
        (space, human, mammal, animal)
    }

    /// T2.1: Transitive inheritance is deduced with multiplied strength.
    #[test]
    fn inheritance_deduction() {
        let (mut space, human, mammal, animal) = taxonomy();
        let link = space
            .infer_inheritance(human, mammal, animal)
            .expect("infer")
            .expect("premises present");

        let tv = space.truth_value(link).expect("tv");
        assert!((tv.strength() - 0.765).abs() < 1e-5);
        assert_eq!(space.query_outgoing(link), vec![human, animal]);
        assert!((space.reasoning_accuracy() - 1.0).abs() < 1e-6);
    }

    /// T2.2: Missing premises produce nothing and count nothing.
    #[test]
    fn missing_premise_is_silent() {
        let (mut space, human, mammal, animal) = taxonomy();
        let before = space.len();
        assert_eq!(
            space.infer_inheritance(animal, mammal, human).expect("infer"),
            None
        );
        assert_eq!(space.len(), before);
        assert_eq!(space.stats().total_inferences, 0);
    }

    /// T2.3: Similarity needs shared inheritance evidence.
    #[test]
    fn similarity_from_shared_links() {
        let (mut space, human, mammal, animal) = taxonomy();
        assert_eq!(space.infer_similarity(human, animal).expect("sim"), None);

        let link = space
            .infer_similarity(human, mammal)
            .expect("sim")
            .expect("similar");
        assert_eq!(space.get(link).expect("link").atom_type(), AtomType::Similarity);
        let stats = space.stats();
        assert_eq!(stats.total_inferences, 2);
        assert_eq!(stats.successful_inferences, 1);
    }

    /// T2.4: Spreading splits STI over neighbours and ticks decay it.
    #[test]
    fn attention_spreads_and_decays() {
        let mut space = AtomSpace::default();
        let a = space.add_node(AtomType::Concept, "a").expect("a");
        let b = space.add_node(AtomType::Concept, "b").expect("b");
        let link = space.add_link(AtomType::Member, &[a, b]).expect("link");

        space.spread_attention(link, 0.4).expect("spread");
        let sti_a = space.attention_value(a).expect("a").sti();
        assert!((sti_a - 0.2).abs() < 1e-6);

        space.update_attention_values();
        let after = space.attention_value(a).expect("a");
        assert!(after.sti() < sti_a);
        assert!(after.lti() > 0.0);
        assert!(matches!(
            space.spread_attention(AtomId(42), 0.1),
            Err(CogError::AtomNotFound(_))
        ));
    }
}

// =============================================================================
// TIER T3: COGFLUENCE UNITS & WORKFLOWS
// =============================================================================

mod t3_cogfluence {
    use super::*;

    /// T3.1: Relations are symmetric, deduplicated and never reflexive.
    #[test]
    fn relations() {
        let mut store = CogfluenceStore::default();
        let a = store.add_unit("a", UnitType::Concept, None).expect("a");
        let b = store.add_unit("b", UnitType::Concept, None).expect("b");

        store.add_relation(a, b).expect("relate");
        store.add_relation(b, a).expect("relate again");
        assert_eq!(store.unit(a).expect("a").related(), &[b]);
        assert_eq!(store.unit(b).expect("b").related(), &[a]);
        assert!(matches!(
            store.add_relation(a, a),
            Err(CogError::SelfRelation(_))
        ));
        assert!(matches!(
            store.add_relation(a, UnitId(77)),
            Err(CogError::UnitNotFound(_))
        ));
    }

    /// T3.2: Executing a workflow boosts every step's unit.
    #[test]
    fn workflow_execution() {
        let mut store = CogfluenceStore::default();
        let step = store.add_unit("step", UnitType::Rule, None).expect("step");
        let wf = store.create_workflow("wf").expect("wf");
        assert!(matches!(
            store.execute_workflow(wf),
            Err(CogError::EmptyWorkflow(_))
        ));

        store.add_workflow_step(wf, step).expect("add step");
        let run = store.execute_workflow(wf).expect("run");
        assert_eq!(run.steps_executed, 1);
        assert_eq!(run.steps_skipped, 0);
        assert!((run.success_rate - 1.0).abs() < 1e-6);

        let unit = store.unit(step).expect("unit");
        assert!((unit.activation() - 0.6).abs() < 1e-6);
        assert!((unit.attention() - 0.55).abs() < 1e-6);
        let workflow = store.workflow(wf).expect("workflow");
        assert!(!workflow.is_active());
        assert!((workflow.completion_ratio() - 1.0).abs() < 1e-6);
    }

    /// T3.3: Unit and workflow limits are enforced.
    #[test]
    fn capacity_enforced() {
        let config = CogfluenceConfig {
            max_units: 1,
            max_workflows: 1,
            ..CogfluenceConfig::default()
        };
        let mut store = CogfluenceStore::new(&config);
        store.add_unit("a", UnitType::Concept, None).expect("a");
        store.create_workflow("w").expect("w");

        assert!(matches!(
            store.add_unit("b", UnitType::Concept, None),
            Err(CogError::CapacityExceeded {
                kind: CapacityKind::Units,
                ..
            })
        ));
        assert!(matches!(
            store.create_workflow("x"),
            Err(CogError::CapacityExceeded {
                kind: CapacityKind::Workflows,
                ..
            })
        ));
    }

    /// T3.4: Coherence is the mean pairwise similarity.
    #[test]
    fn coherence() {
        let mut store = CogfluenceStore::default();
        assert_eq!(store.compute_coherence(), 0.0);
        store.add_unit("a", UnitType::Concept, None).expect("a");
        store.add_unit("b", UnitType::Concept, None).expect("b");
        store.add_unit("c", UnitType::Rule, None).expect("c");
        // Zero embeddings fall back to the type rule: 0.5, 0.1, 0.1.
        let expected = (0.5 + 0.1 + 0.1) / 3.0;
        assert!((store.compute_coherence() - expected).abs() < 1e-6);
        assert!((store.coherence() - expected).abs() < 1e-6);
    }
}

// =============================================================================
// TIER T4: ENCODING, TRANSDUCTION & SNAPSHOTS
// =============================================================================

mod t4_encoding_and_transduction {
    use super::*;
    use cogweave_core::{
        CognitiveKernel, KernelConfig, Pipeline, encode_tree, pipeline_from_bytes,
        pipeline_to_bytes,
    };

    /// T4.1: Known trees map to known matula values.
    #[test]
    fn matula_values() {
        assert_eq!(encode_tree("()").expect("leaf").matula_value, 1);
        assert_eq!(encode_tree("(())").expect("path").matula_value, 3);
        assert_eq!(encode_tree("(()())").expect("cherry").matula_value, 9);
        assert_eq!(encode_tree("((())").expect("unbalanced").matula_value, 1);
        assert_eq!(encode_tree("").expect("empty").matula_value, 1);
    }

    /// T4.2: Tree units carry the encoding summary as their embedding.
    #[test]
    fn tree_units() {
        let mut store = CogfluenceStore::default();
        let mut kernel = CognitiveKernel::default();
        let id = store
            .add_tree_unit("cherry", UnitType::Pattern, "(()())", &mut kernel)
            .expect("tree unit");

        let embedding = store.unit(id).expect("unit").embedding().as_slice().to_vec();
        assert_eq!(embedding.len(), 64);
        assert_eq!(&embedding[..4], &[3.0, 9.0, 0.0, 9.0]);
        assert!(kernel.coordinates_of(9).is_some());
    }

    /// T4.3: A full pipeline run links unit, atom and tensor.
    #[test]
    fn full_pipeline() {
        let mut pipeline = Pipeline::default();
        let receipt = pipeline.full_pipeline("hello").expect("pipeline");

        assert_eq!(
            receipt.to_string(),
            "Processed: hello (Cogfluence:1, OpenCog:1)"
        );
        let unit = pipeline.cogfluence().unit(receipt.unit).expect("unit");
        assert_eq!(unit.atom(), Some(receipt.atom));
        let atom = pipeline.atomspace().get(receipt.atom).expect("atom");
        assert_eq!(atom.source_unit(), Some(receipt.unit));
        assert_eq!(pipeline.transductions(), (2, 2));
    }

    /// T4.4: Failed transductions are counted but change nothing.
    #[test]
    fn failed_transduction_counted() {
        let mut pipeline = Pipeline::default();
        assert!(matches!(
            pipeline.transduce_unit(UnitId(9)),
            Err(CogError::UnitNotFound(_))
        ));
        assert!(pipeline.atomspace().is_empty());
        assert_eq!(pipeline.transductions(), (1, 0));
    }

    /// T4.5: Snapshots restore every store and counter.
    #[test]
    fn snapshot_restores_state() {
        let mut pipeline = Pipeline::default();
        pipeline.full_pipeline("one").expect("one");
        pipeline.full_pipeline("two").expect("two");
        pipeline.tick();

        let bytes = pipeline_to_bytes(&pipeline).expect("encode");
        let restored = pipeline_from_bytes(&bytes, &KernelConfig::default()).expect("decode");

        assert_eq!(restored.stats(), pipeline.stats());
        assert_eq!(restored.cogfluence().clock(), pipeline.cogfluence().clock());
    }
}
