//! Hook registrar integration tests

use module_resolver::{
    EventHost, HookRegistrar, ModuleOrigin, ModuleResolver, ResolverConfig,
};
use std::sync::Arc;

mod common;
use common::*;

fn registrar() -> (Arc<EventHost>, Arc<HookRegistrar>, Arc<ModuleResolver>) {
    let host = Arc::new(EventHost::new());
    let t = TestResolver::new(Vec::new(), true);
    let resolver = t.resolver.clone();
    let registrar = Arc::new(HookRegistrar::new(host.clone(), resolver.clone()));
    (host, registrar, resolver)
}

#[test]
fn test_register_is_idempotent_per_context() {
    let (host, registrar, _resolver) = registrar();

    let first = registrar.register("plugin-context");
    let second = registrar.register("plugin-context");
    assert_eq!(host.subscription_count("plugin-context"), 1);
    assert!(registrar.is_registered("plugin-context"));

    drop(first);
    assert_eq!(host.subscription_count("plugin-context"), 0);
    // The surviving guard's drop is a no-op now
    drop(second);
    assert_eq!(host.subscription_count("plugin-context"), 0);
}

#[test]
fn test_contexts_are_tracked_independently() {
    let (host, registrar, _resolver) = registrar();

    let _a = registrar.register("a");
    let _b = registrar.register("b");
    assert_eq!(registrar.registered_contexts(), vec!["a", "b"]);
    assert_eq!(host.subscription_count("a"), 1);
    assert_eq!(host.subscription_count("b"), 1);

    registrar.unregister("a");
    assert_eq!(registrar.registered_contexts(), vec!["b"]);
    assert_eq!(host.subscription_count("a"), 0);
    assert_eq!(host.subscription_count("b"), 1);
}

#[test]
fn test_unregister_unknown_context_is_noop() {
    let (_host, registrar, _resolver) = registrar();
    registrar.unregister("never-registered");
    assert!(!registrar.is_registered("never-registered"));
}

#[test]
fn test_guard_release_unregisters() {
    let (host, registrar, _resolver) = registrar();

    let guard = registrar.register("ctx");
    assert_eq!(guard.context_id(), "ctx");
    guard.release();

    assert_eq!(host.subscription_count("ctx"), 0);
    assert!(!registrar.is_registered("ctx"));
}

#[test]
fn test_reregister_after_drop() {
    let (host, registrar, _resolver) = registrar();

    drop(registrar.register("ctx"));
    assert_eq!(host.subscription_count("ctx"), 0);

    let _guard = registrar.register("ctx");
    assert_eq!(host.subscription_count("ctx"), 1);
}

#[test]
fn test_hook_resolves_for_the_host() {
    let (host, registrar, resolver) = registrar();
    resolver.register(stub_handle("Analytics"));

    let _guard = registrar.register("default");

    // The host supplies a full identifier; the hook uses the bare name
    let answer = host.raise_missing("default", "Analytics, Version=1.2.0, Culture=neutral");
    let handle = answer.unwrap();
    assert_eq!(handle.name(), "Analytics");
    assert_eq!(handle.origin(), &ModuleOrigin::Embedded);
}

#[test]
fn test_hook_misses_unhooked_context() {
    let (host, registrar, resolver) = registrar();
    resolver.register(stub_handle("Analytics"));

    let _guard = registrar.register("hooked");
    assert!(host.raise_missing("other", "Analytics").is_none());
}

#[test]
fn test_hook_never_panics_into_the_host() {
    // All sources panic; the host still gets a calm "not found"
    let host = Arc::new(EventHost::new());
    let config = ResolverConfig {
        search_dirs: Vec::new(),
        embedded_first: true,
        module_extension: "ext".to_string(),
        logging: None,
    };
    let resolver = Arc::new(ModuleResolver::with_backend(
        CountingNativeLoader::new(),
        Arc::new(PanickingLocator),
        Arc::new(PanickingScanner),
        &config,
    ));
    resolver.register(stub_handle("host-module"));

    let registrar = Arc::new(HookRegistrar::new(host.clone(), resolver));
    let _guard = registrar.register("default");

    assert!(host.raise_missing("default", "Unknown, Version=1.0").is_none());
}

#[test]
fn test_unregister_by_name_disarms_guard() {
    let (host, registrar, _resolver) = registrar();

    let guard = registrar.register("ctx");
    registrar.unregister("ctx");
    assert_eq!(host.subscription_count("ctx"), 0);

    // Guard drop after manual unregistration stays a no-op
    drop(guard);
    assert_eq!(host.subscription_count("ctx"), 0);
    assert!(registrar.registered_contexts().is_empty());
}
