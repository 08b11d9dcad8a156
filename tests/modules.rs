use ferrous_wiring::{
    AnyArc, ContainerBuilder, ContainerBuilderExt, DiError, DiResult, EntryModule, ModuleRegistry,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[tokio::test]
async fn test_modules_are_passed_in_declaration_order() {
    let mut registry = ModuleRegistry::new();
    registry.insert("./first", "one".to_string());
    registry.insert("./second", 2u32);

    let mut builder = ContainerBuilder::new().with_resolver(registry);
    builder
        .register("combined")
        .requires("./first")
        .requires("./second")
        .try_factory(|modules, _| {
            let first = modules.get::<String>(0).ok_or("first module missing")?;
            let second = modules.get::<u32>(1).ok_or("second module missing")?;
            Ok(format!("{}-{}", first, second))
        });

    let container = builder.finalize().await.unwrap();
    let combined = container.get_required::<String>("combined").await.unwrap();
    assert_eq!(combined.as_str(), "one-2");
}

#[tokio::test]
async fn test_unresolvable_module_fails_the_build() {
    let mut builder = ContainerBuilder::new();
    builder.register("needs-module").requires("./nowhere");
    builder.register("top").depends_on("needs-module");

    let container = builder.finalize().await.unwrap();

    let err = container.get("needs-module").await.unwrap_err();
    assert!(matches!(
        &err,
        DiError::ModuleNotFound { entry, reference } if entry == "needs-module" && reference == "./nowhere"
    ));

    let err = container.get("top").await.unwrap_err();
    assert!(matches!(err.root_cause(), DiError::ModuleNotFound { .. }));
}

#[tokio::test]
async fn test_closure_resolver_is_asked_on_every_build() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();

    let resolver = move |reference: &str| -> Option<AnyArc> {
        seen.fetch_add(1, Ordering::SeqCst);
        (reference == "clock").then(|| Arc::new(1_000u64) as AnyArc)
    };

    let mut builder = ContainerBuilder::new().with_resolver(resolver);
    builder
        .register("now")
        .prototype()
        .requires("clock")
        .try_factory(|modules, _| Ok(*modules.get::<u64>(0).ok_or("clock missing")?));

    let container = builder.finalize().await.unwrap();
    assert_eq!(*container.get_required::<u64>("now").await.unwrap(), 1_000);
    assert_eq!(*container.get_required::<u64>("now").await.unwrap(), 1_000);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

struct StorageEntries {
    url: String,
}

impl EntryModule for StorageEntries {
    fn register_entries(self, builder: &mut ContainerBuilder) -> DiResult<()> {
        builder.register("storage.url").static_value(self.url);
        builder
            .register("storage")
            .depends_on("storage.url")
            .factory(|deps| format!("connected to {}", deps.get::<String>("storage.url").unwrap_or_default()));
        Ok(())
    }
}

struct ServiceEntries;

impl EntryModule for ServiceEntries {
    fn register_entries(self, builder: &mut ContainerBuilder) -> DiResult<()> {
        builder.register("service").depends_on("storage");
        Ok(())
    }
}

#[tokio::test]
async fn test_entry_modules_compose() {
    let builder = ContainerBuilder::new()
        .with_module(StorageEntries { url: "mem://".to_string() })
        .unwrap()
        .with_module(ServiceEntries)
        .unwrap();
    assert_eq!(builder.len(), 3);

    let container = builder.finalize().await.unwrap();
    let storage = container.get_required::<String>("storage").await.unwrap();
    assert_eq!(storage.as_str(), "connected to mem://");
}

#[tokio::test]
async fn test_entry_module_with_missing_dependency_fails_validation() {
    let mut builder = ContainerBuilder::new();
    builder.add_module(ServiceEntries).unwrap();

    let err = builder.finalize().await.unwrap_err();
    assert!(matches!(err, DiError::MissingDependencies(ref m) if m[0].dependency == "storage"));
}

#[tokio::test]
async fn test_plain_factory_still_requires_its_modules() {
    let mut builder = ContainerBuilder::new();
    builder.register("uses-module").requires("./absent").factory(|_| 1u8);

    let container = builder.finalize().await.unwrap();
    let err = container.get("uses-module").await.unwrap_err();
    assert!(matches!(err, DiError::ModuleNotFound { ref reference, .. } if reference == "./absent"));
}
