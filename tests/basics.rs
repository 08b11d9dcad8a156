use ferrous_wiring::{
    AsyncFactory, BoxError, ContainerBuilder, Dependencies, ModuleRegistry, Modules,
};
use std::sync::Arc;
use std::time::Duration;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn sample_builder() -> ContainerBuilder {
    let mut modules = ModuleRegistry::new();
    modules.insert("./resources/d", 1i32);

    let mut builder = ContainerBuilder::new().with_resolver(modules);
    builder.register("a").static_value(1i32);
    builder.register("b").factory(|_| 2i32);
    builder
        .register("c")
        .depends_on("a")
        .depends_on("b")
        .factory(|deps| deps.get::<i32>("a").unwrap() + deps.get::<i32>("b").unwrap());
    builder
        .register("d")
        .requires("./resources/d")
        .try_factory(|modules, _| Ok(*modules.get::<i32>(0).unwrap()));
    builder
        .register("e")
        .depends_on("a")
        .depends_on("b")
        .depends_on("c")
        .depends_on("d");
    builder
}

#[tokio::test]
async fn test_values_dependencies_and_modules() {
    init_tracing();
    let container = sample_builder().finalize().await.unwrap();

    assert_eq!(*container.get_required::<i32>("a").await.unwrap(), 1);
    assert_eq!(*container.get_required::<i32>("b").await.unwrap(), 2);
    assert_eq!(*container.get_required::<i32>("c").await.unwrap(), 3);
    assert_eq!(*container.get_required::<i32>("d").await.unwrap(), 1);
}

#[tokio::test]
async fn test_default_factory_builds_dependency_map() {
    let container = sample_builder().finalize().await.unwrap();

    let e = container.get_required::<Dependencies>("e").await.unwrap();
    assert_eq!(e.names().collect::<Vec<_>>(), vec!["a", "b", "c", "d"]);
    assert_eq!(e.get::<i32>("a"), Some(1));
    assert_eq!(e.get::<i32>("b"), Some(2));
    assert_eq!(e.get::<i32>("c"), Some(3));
    assert_eq!(e.get::<i32>("d"), Some(1));
}

#[tokio::test]
async fn test_entry_without_dependencies_builds_empty_map() {
    let mut builder = ContainerBuilder::new();
    builder.register("empty");

    let container = builder.finalize().await.unwrap();
    let deps = container.get_required::<Dependencies>("empty").await.unwrap();
    assert!(deps.is_empty());
}

#[tokio::test]
async fn test_unknown_name_resolves_to_nothing() {
    let container = sample_builder().finalize().await.unwrap();

    assert!(container.get("zzz").await.unwrap().is_none());
    assert!(container.get_as::<i32>("zzz").await.unwrap().is_none());
    assert!(container.get_required::<i32>("zzz").await.is_err());
}

#[tokio::test]
async fn test_nothing_built_dependency_is_left_out() {
    let mut builder = ContainerBuilder::new();
    builder
        .register("maybe")
        .optional_factory(|_, _| None::<String>);
    builder.register("present").static_value("here".to_string());
    builder
        .register("report")
        .depends_on("maybe")
        .depends_on("present");

    let container = builder.finalize().await.unwrap();
    let report = container.get_required::<Dependencies>("report").await.unwrap();

    assert!(!report.contains("maybe"));
    assert_eq!(report.get::<String>("present").as_deref(), Some("here"));
    assert_eq!(report.len(), 1);
}

#[tokio::test]
async fn test_async_factory() {
    let mut builder = ContainerBuilder::new();
    builder.register("base").static_value(20u64);
    builder
        .register("slow")
        .depends_on("base")
        .async_factory(|_modules, deps| async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            let base = deps.require::<u64>("base")?;
            Ok::<_, BoxError>(*base + 1)
        });

    let container = builder.finalize().await.unwrap();
    assert_eq!(*container.get_required::<u64>("slow").await.unwrap(), 21);
}

struct Greeter {
    greeting: String,
}

struct GreeterFactory;

#[async_trait::async_trait]
impl AsyncFactory<Greeter> for GreeterFactory {
    async fn create(&self, _modules: &Modules, deps: &Dependencies) -> Result<Arc<Greeter>, BoxError> {
        let name = deps.require::<String>("name")?;
        Ok(Arc::new(Greeter { greeting: format!("hello {}", name) }))
    }
}

#[tokio::test]
async fn test_factory_trait_impl() {
    let mut builder = ContainerBuilder::new();
    builder.register("name").static_value("world".to_string());
    builder
        .register("greeter")
        .depends_on("name")
        .factory_impl(GreeterFactory);

    let container = builder.finalize().await.unwrap();
    let greeter = container.get_required::<Greeter>("greeter").await.unwrap();
    assert_eq!(greeter.greeting, "hello world");
}

#[tokio::test]
async fn test_container_introspection() {
    let container = sample_builder().finalize().await.unwrap();

    assert_eq!(container.names(), vec!["a", "b", "c", "d", "e"]);
    assert!(container.contains("c"));
    assert!(!container.contains("zzz"));
    assert_eq!(container.len(), 5);

    let descriptors = container.descriptors();
    let c = descriptors.iter().find(|d| d.name == "c").unwrap();
    assert_eq!(c.dependencies, vec!["a".to_string(), "b".to_string()]);
    let d = descriptors.iter().find(|d| d.name == "d").unwrap();
    assert_eq!(d.required_modules, vec!["./resources/d".to_string()]);
}

#[tokio::test]
async fn test_duplicate_dependency_names_collapse_to_one_key() {
    let counter = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let c = counter.clone();

    let mut builder = ContainerBuilder::new();
    builder.register("shared").static_value(7i32);
    builder
        .register("fresh")
        .prototype()
        .factory(move |_| c.fetch_add(1, std::sync::atomic::Ordering::SeqCst) + 1);
    builder
        .register("twice")
        .depends_on("shared")
        .depends_on("fresh")
        .depends_on("shared")
        .depends_on("fresh");

    let container = builder.finalize().await.unwrap();
    let deps = container.get_required::<Dependencies>("twice").await.unwrap();

    assert_eq!(deps.names().collect::<Vec<_>>(), vec!["shared", "fresh"]);
    assert_eq!(deps.get::<i32>("shared"), Some(7));
    // Both requests for the prototype are issued before either settles,
    // so they share one in-flight build.
    assert_eq!(deps.get::<usize>("fresh"), Some(1));
    assert_eq!(counter.load(std::sync::atomic::Ordering::SeqCst), 1);
}
