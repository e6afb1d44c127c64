#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Integration tests for dependency-ordered sequencing

mod common;

use std::cell::RefCell;
use std::sync::Arc;

use common::{create_catalog, names, position};
use object_types::{
    DependencyKind, IncludedTypesFilter, OutputItem, SequenceAnalyzer, TemplateEntityProvider,
    TypeCapability, TypeDescriptor, TypeRegistry, WellKnownTypes,
};

fn platform_types() -> Vec<TypeDescriptor> {
    vec![
        TypeDescriptor::new("cms.site"),
        TypeDescriptor::new("cms.user"),
        TypeDescriptor::new("cms.role"),
        TypeDescriptor::new("cms.userrole")
            .with_parent("cms.user")
            .with_capability(TypeCapability::Binding)
            .with_dependency("RoleID", "cms.role", DependencyKind::Binding),
        TypeDescriptor::new("cms.page")
            .with_parent("cms.site")
            .with_dependency("OwnerID", "cms.user", DependencyKind::Required)
            .with_capability(TypeCapability::SiteObject),
        TypeDescriptor::new("cms.category"),
        TypeDescriptor::new("cms.pagecategory")
            .with_parent("cms.page")
            .with_capability(TypeCapability::Binding)
            .with_dependency("CategoryID", "cms.category", DependencyKind::Binding),
        TypeDescriptor::new("cms.pagetemplate")
            .with_capability(TypeCapability::SiteObject)
            .with_capability(TypeCapability::GlobalVariant),
        TypeDescriptor::new("cms.form")
            .with_dependency("PageID", "cms.page", DependencyKind::Required)
            .with_capability(TypeCapability::DynamicDependency),
    ]
}

fn all_names() -> Vec<String> {
    platform_types().into_iter().map(|d| d.object_type).collect()
}

// =============================================================================
// Ordering Properties
// =============================================================================

#[test]
fn test_sequence_is_deterministic() {
    let catalog = create_catalog(platform_types());
    let filter = IncludedTypesFilter::new(all_names());

    let analyzer = SequenceAnalyzer::new(&catalog, &filter);
    let first: Vec<OutputItem> = analyzer.sequence().collect();
    let second: Vec<OutputItem> = analyzer.sequence().collect();
    let fresh: Vec<OutputItem> = SequenceAnalyzer::new(&catalog, &filter).sequence().collect();

    assert_eq!(first, second);
    assert_eq!(first, fresh);
}

#[test]
fn test_dependencies_precede_dependents() {
    let catalog = create_catalog(platform_types());
    let filter = IncludedTypesFilter::new(all_names());
    let items: Vec<OutputItem> = SequenceAnalyzer::new(&catalog, &filter).sequence().collect();

    for descriptor in catalog.descriptors() {
        let index = position(&items, &descriptor.object_type);
        let targets = descriptor
            .dependencies
            .iter()
            .map(|d| d.target_type.as_str())
            .chain(descriptor.parent_type.as_deref());
        for target in targets {
            assert!(
                position(&items, target) < index,
                "{target} must precede {}: {}",
                descriptor.object_type,
                names(&items).join(", ")
            );
        }
        if descriptor.is_site_object() {
            assert!(position(&items, "cms.site") < index);
        }
    }
}

#[test]
fn test_sequence_is_complete() {
    let catalog = create_catalog(platform_types());
    let filter = IncludedTypesFilter::new(all_names());
    let items: Vec<OutputItem> = SequenceAnalyzer::new(&catalog, &filter).sequence().collect();

    // one item per type, two for the global-variant site object
    assert_eq!(items.len(), all_names().len() + 1);
    for name in all_names() {
        let count = items.iter().filter(|i| i.object_type == name).count();
        let expected = if name == "cms.pagetemplate" { 2 } else { 1 };
        assert_eq!(count, expected, "{name}: {}", names(&items).join(", "));
    }

    let template: Vec<&OutputItem> = items
        .iter()
        .filter(|i| i.object_type == "cms.pagetemplate")
        .collect();
    assert!(!template[0].is_site_object);
    assert!(template[1].is_site_object);
}

#[test]
fn test_roots_are_emitted_before_deferred_dependents() {
    let catalog = create_catalog(vec![
        TypeDescriptor::new("cms.a").with_dependency("BID", "cms.b", DependencyKind::Required),
        TypeDescriptor::new("cms.b"),
        TypeDescriptor::new("cms.zzz"),
    ]);
    let filter = IncludedTypesFilter::new(["cms.a", "cms.b", "cms.zzz"]);
    let items: Vec<OutputItem> = SequenceAnalyzer::new(&catalog, &filter).sequence().collect();

    assert_eq!(names(&items), vec!["cms.b", "cms.zzz", "cms.a"]);
}

#[test]
fn test_dynamic_types_come_last() {
    let catalog = create_catalog(vec![
        TypeDescriptor::new("cms.aform")
            .with_dependency("PageID", "cms.zpage", DependencyKind::Required)
            .with_capability(TypeCapability::DynamicDependency),
        TypeDescriptor::new("cms.bstatic").with_dependency(
            "FormID",
            "cms.aform",
            DependencyKind::Required,
        ),
        TypeDescriptor::new("cms.mid"),
        TypeDescriptor::new("cms.zpage"),
    ]);
    let filter = IncludedTypesFilter::new(["cms.aform", "cms.bstatic", "cms.mid", "cms.zpage"]);
    let items: Vec<OutputItem> = SequenceAnalyzer::new(&catalog, &filter).sequence().collect();

    assert_eq!(
        names(&items),
        vec!["cms.bstatic", "cms.mid", "cms.zpage", "cms.aform"]
    );
    assert!(items[3].has_dynamic_dependency);
    assert!(items[..3].iter().all(|i| !i.has_dynamic_dependency));
}

#[test]
fn test_dynamic_types_follow_all_static_types() {
    let catalog = create_catalog(platform_types());
    let filter = IncludedTypesFilter::new(all_names());
    let items: Vec<OutputItem> = SequenceAnalyzer::new(&catalog, &filter).sequence().collect();

    let first_dynamic = items.iter().position(|i| i.has_dynamic_dependency).unwrap();
    assert!(items[first_dynamic..].iter().all(|i| i.has_dynamic_dependency));
    assert_eq!(items.last().unwrap().object_type, "cms.form");
}

// =============================================================================
// Binding Interleaving
// =============================================================================

#[test]
fn test_binding_follows_its_owner() {
    let catalog = create_catalog(vec![
        TypeDescriptor::new("cms.zowner"),
        TypeDescriptor::new("cms.abinding")
            .with_parent("cms.zowner")
            .with_capability(TypeCapability::Binding),
    ]);
    let filter = IncludedTypesFilter::new(["cms.zowner", "cms.abinding"]);
    let items: Vec<OutputItem> = SequenceAnalyzer::new(&catalog, &filter).sequence().collect();

    assert_eq!(names(&items), vec!["cms.zowner", "cms.abinding"]);
}

#[test]
fn test_binding_waits_for_all_its_targets() {
    let catalog = create_catalog(platform_types());
    let filter = IncludedTypesFilter::new(all_names());
    let items: Vec<OutputItem> = SequenceAnalyzer::new(&catalog, &filter).sequence().collect();

    let userrole = position(&items, "cms.userrole");
    assert!(position(&items, "cms.user") < userrole);
    assert!(position(&items, "cms.role") < userrole);

    let pagecategory = position(&items, "cms.pagecategory");
    assert!(position(&items, "cms.page") < pagecategory);
    assert!(position(&items, "cms.category") < pagecategory);
}

#[test]
fn test_site_page_and_binding_example() {
    let catalog = create_catalog(vec![
        TypeDescriptor::new("cms.site"),
        TypeDescriptor::new("cms.page").with_parent("cms.site"),
        TypeDescriptor::new("cms.pagecategory")
            .with_parent("cms.page")
            .with_capability(TypeCapability::Binding),
    ]);
    let requested = ["cms.site", "cms.page", "cms.pagecategory"];
    let filter = IncludedTypesFilter::new(requested);
    let items: Vec<OutputItem> = SequenceAnalyzer::with_types(&catalog, &filter, requested)
        .sequence()
        .collect();

    assert_eq!(names(&items), vec!["cms.site", "cms.page", "cms.pagecategory"]);
}

// =============================================================================
// Cycles and Filtering
// =============================================================================

#[test]
fn test_two_cycle_is_reported_once() {
    let catalog = create_catalog(vec![
        TypeDescriptor::new("cms.a").with_dependency("BID", "cms.b", DependencyKind::Required),
        TypeDescriptor::new("cms.b").with_dependency("AID", "cms.a", DependencyKind::Required),
    ]);
    let filter = IncludedTypesFilter::new(["cms.a", "cms.b"]);
    let cycles = RefCell::new(Vec::new());
    let analyzer = SequenceAnalyzer::new(&catalog, &filter).with_log(|message, _, is_cycle| {
        if is_cycle {
            cycles.borrow_mut().push(message.to_owned());
        }
    });

    let items: Vec<OutputItem> = analyzer.sequence().collect();
    assert_eq!(items.len(), 2);
    assert_eq!(items.iter().filter(|i| i.object_type == "cms.a").count(), 1);
    assert_eq!(items.iter().filter(|i| i.object_type == "cms.b").count(), 1);
    assert_eq!(cycles.borrow().len(), 1, "{}", cycles.borrow().join("; "));
}

#[test]
fn test_self_reference_is_not_a_cycle() {
    let catalog = create_catalog(vec![
        TypeDescriptor::new("cms.page").with_dependency("ParentID", "cms.page", DependencyKind::Required),
    ]);
    let filter = IncludedTypesFilter::new(["cms.page"]);
    let cycles = RefCell::new(0);
    let analyzer = SequenceAnalyzer::new(&catalog, &filter).with_log(|_, _, is_cycle| {
        if is_cycle {
            *cycles.borrow_mut() += 1;
        }
    });

    assert_eq!(analyzer.sequence().count(), 1);
    assert_eq!(*cycles.borrow(), 0);
}

#[test]
fn test_cycles_without_log_callback() {
    let catalog = create_catalog(vec![
        TypeDescriptor::new("cms.a").with_dependency("BID", "cms.b", DependencyKind::Required),
        TypeDescriptor::new("cms.b").with_dependency("CID", "cms.c", DependencyKind::Required),
        TypeDescriptor::new("cms.c").with_dependency("AID", "cms.a", DependencyKind::Required),
    ]);
    let filter = IncludedTypesFilter::new(["cms.a", "cms.b", "cms.c"]);
    let items: Vec<OutputItem> = SequenceAnalyzer::new(&catalog, &filter).sequence().collect();
    assert_eq!(items.len(), 3);
}

#[test]
fn test_excluded_types_are_walked_but_not_emitted() {
    let catalog = create_catalog(vec![
        TypeDescriptor::new("cms.y").with_dependency("XID", "cms.x", DependencyKind::Required),
        TypeDescriptor::new("cms.x").with_dependency("ZID", "cms.z", DependencyKind::Required),
        TypeDescriptor::new("cms.z"),
    ]);
    let filter = IncludedTypesFilter::new(["cms.y", "cms.z"]);
    let items: Vec<OutputItem> = SequenceAnalyzer::new(&catalog, &filter).sequence().collect();

    assert_eq!(names(&items), vec!["cms.z", "cms.y"]);
}

#[test]
fn test_unknown_requested_types_are_skipped() {
    let catalog = create_catalog(vec![TypeDescriptor::new("cms.site")]);
    let filter = IncludedTypesFilter::new(["cms.site", "cms.missing"]);
    let analyzer = SequenceAnalyzer::with_types(&catalog, &filter, ["cms.site", "cms.missing"]);

    assert_eq!(analyzer.output_type_names().collect::<Vec<_>>(), vec!["cms.site"]);
    assert_eq!(analyzer.sequence().count(), 1);
}

// =============================================================================
// Item Expansion and Dynamic Names
// =============================================================================

#[test]
fn test_global_variant_site_emits_two_items() {
    let catalog = create_catalog(vec![
        TypeDescriptor::new("cms.site").with_capability(TypeCapability::GlobalVariant),
    ]);
    let filter = IncludedTypesFilter::new(["cms.site"]);
    let items: Vec<OutputItem> = SequenceAnalyzer::new(&catalog, &filter).sequence().collect();

    assert_eq!(
        items,
        vec![
            OutputItem::new("cms.site", false, false),
            OutputItem::new("cms.site", true, false),
        ]
    );
}

#[test]
fn test_provider_types_are_sequenced_verbatim() {
    let provider = TemplateEntityProvider::new()
        .with_template("cms.document.", TypeDescriptor::default().with_parent("cms.page"));
    let registry = TypeRegistry::new(WellKnownTypes::default()).with_entity_provider(Arc::new(provider));
    registry
        .register("cms.page", TypeDescriptor::default(), "PageInfo")
        .unwrap();
    registry.mark_pre_initialized();
    let catalog = registry.ensure_all().unwrap();

    let filter = IncludedTypesFilter::new(["cms.page"]);
    let analyzer =
        SequenceAnalyzer::with_types(&catalog, &filter, ["cms.page", "cms.document.Article"]);
    let items: Vec<OutputItem> = analyzer.sequence().collect();

    assert_eq!(names(&items), vec!["cms.page", "cms.document.Article"]);
}

#[test]
fn test_consumer_can_stop_early() {
    let catalog = create_catalog(platform_types());
    let filter = IncludedTypesFilter::new(all_names());
    let analyzer = SequenceAnalyzer::new(&catalog, &filter);

    let mut sequence = analyzer.sequence();
    let head: Vec<OutputItem> = sequence.by_ref().take(2).collect();
    assert_eq!(head.len(), 2);
    assert_eq!(sequence.emitted().count(), 2);

    let full: Vec<OutputItem> = analyzer.sequence().collect();
    assert_eq!(&full[..2], &head[..]);
}
