use bootkit::kernel::bootstrap::{
    BootstrapState, ContainerConfigurer, MapperConfigurer, MapperUnitRegistry, UnitRegistry, UnitResult,
};
use bootkit::kernel::container::ServiceContainer;
use bootkit::kernel::mapping::MappingExpression;
use bootkit::{BootstrapError, ExclusionSet, Module, ServiceBootstrapFactory, mapper_bootstrap};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone)]
struct Tenant(&'static str);

#[derive(Debug, PartialEq)]
struct Greeting(String);

#[derive(Debug)]
struct Counter(AtomicUsize);

#[derive(Default)]
struct GreetingUnit;

impl ContainerConfigurer<ServiceContainer, Tenant> for GreetingUnit {
    fn configure(&self, container: &mut ServiceContainer, settings: &Tenant) -> UnitResult {
        container.register_instance(Greeting(format!("hello {}", settings.0)));
        Ok(())
    }
}

#[derive(Default)]
struct CounterUnit;

impl ContainerConfigurer<ServiceContainer, Tenant> for CounterUnit {
    fn configure(&self, container: &mut ServiceContainer, _: &Tenant) -> UnitResult {
        container.register_instance(Counter(AtomicUsize::new(0)));
        Ok(())
    }
}

fn register_services(registry: &mut UnitRegistry<ServiceContainer, Tenant>) {
    registry.register::<GreetingUnit>().register::<CounterUnit>();
}

fn modules() -> Option<Vec<Module<UnitRegistry<ServiceContainer, Tenant>>>> {
    Some(vec![Module::new("services", register_services)])
}

#[test]
fn missing_modules_are_named() {
    let err = ServiceBootstrapFactory::create(None, Tenant("acme"), None).unwrap_err();

    assert!(matches!(err, BootstrapError::MissingArgument { ref name, .. } if name == "modules"));
}

#[test]
fn discovered_units_populate_the_container() {
    let mut bootstrap = ServiceBootstrapFactory::create(modules(), Tenant("acme"), None).unwrap();
    assert_eq!(bootstrap.container().len(), 0);

    bootstrap
        .add_post_initialization_action("count", |c: &mut ServiceContainer| {
            c.resolve::<Counter>()?.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .initialize()
        .unwrap();

    assert_eq!(bootstrap.state(), BootstrapState::Initialized);
    assert_eq!(*bootstrap.container().resolve::<Greeting>().unwrap(), Greeting("hello acme".into()));
    assert_eq!(bootstrap.container().resolve::<Counter>().unwrap().0.load(Ordering::SeqCst), 1);
}

#[test]
fn excluded_units_are_skipped() {
    let excluded: ExclusionSet = [std::any::type_name::<GreetingUnit>()].into_iter().collect();
    let mut bootstrap = ServiceBootstrapFactory::create(modules(), Tenant("acme"), Some(excluded)).unwrap();

    bootstrap.initialize().unwrap();

    assert!(!bootstrap.container().is_registered::<Greeting>());
    assert!(bootstrap.container().is_registered::<Counter>());
    assert_eq!(bootstrap.configuration().excluded().len(), 1);
}

// --- mapper ---

#[derive(Debug)]
struct Order {
    id: u32,
    total_cents: u64,
}

#[derive(Debug, PartialEq)]
struct OrderView {
    label: String,
}

struct OrderMaps {
    prefix: &'static str,
}

impl MapperConfigurer<MappingExpression> for OrderMaps {
    fn configure(&self, expression: &mut MappingExpression) -> UnitResult {
        let prefix = self.prefix;
        expression.create_map(move |o: &Order| OrderView {
            label: format!("{prefix}#{} ({}.{:02})", o.id, o.total_cents / 100, o.total_cents % 100),
        });
        Ok(())
    }
}

fn register_maps(registry: &mut MapperUnitRegistry<MappingExpression, Tenant>) {
    registry
        .register_with(|| Ok(OrderMaps { prefix: "order" }))
        .register_with_settings(|t: &Tenant| Ok(OrderMaps { prefix: t.0 }));
}

#[test]
fn mapper_is_built_from_discovered_maps() {
    let mut bootstrap = mapper_bootstrap(vec![Module::new("maps", register_maps)], Some(Tenant("acme"))).unwrap();

    bootstrap.initialize().unwrap();
    let view: OrderView = bootstrap.mapper().unwrap().map(&Order { id: 7, total_cents: 1250 }).unwrap();

    assert_eq!(view, OrderView { label: "acme#7 (12.50)".into() });
}

#[test]
fn mapper_without_settings_uses_default_constructors() {
    let mut bootstrap = mapper_bootstrap(vec![Module::new("maps", register_maps)], None::<Tenant>).unwrap();

    bootstrap.initialize().unwrap();
    let view: OrderView = bootstrap.mapper().unwrap().map(&Order { id: 1, total_cents: 5 }).unwrap();

    assert_eq!(view.label, "order#1 (0.05)");
}

#[test]
fn mapper_without_modules_stays_uninitialized() {
    let mut bootstrap = mapper_bootstrap(Vec::new(), Some(Tenant("acme"))).unwrap();

    bootstrap.initialize().unwrap();

    assert_eq!(bootstrap.mapper().unwrap_err().kind(), "NotInitialized");
}

#[test]
fn feature_registry_reports_defaults() {
    assert!(bootkit::features::is_enabled("data"));
    assert!(!bootkit::features::is_enabled("desktop"));
}
