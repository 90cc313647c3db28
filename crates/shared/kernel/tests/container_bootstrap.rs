use bootkit_kernel::bootstrap::{
    BootstrapConfiguration, BootstrapError, BootstrapState, BoxedContainerUnit, ContainerBootstrap,
    ContainerConfigurer, ExclusionSet, Module, UnitName, UnitRegistry, UnitResult,
    discover_container_units,
};
use bootkit_kernel::{Settings, SettingsError};
use bootkit_kernel::domain::AppEnvironment;
use proptest::prelude::*;
use std::borrow::Cow;

#[derive(Debug, Clone, Default)]
struct TestSettings;

impl Settings for TestSettings {
    fn environment(&self) -> AppEnvironment {
        AppEnvironment::Development
    }

    fn connection_string(&self, name: &str) -> Result<String, SettingsError> {
        Err(SettingsError::NotFound { key: name.to_owned().into(), context: None })
    }

    fn get<T>(&self, key: &str) -> Result<T, SettingsError>
    where
        T: serde::de::DeserializeOwned,
    {
        Err(SettingsError::NotFound { key: key.to_owned().into(), context: None })
    }
}

#[derive(Debug, Default)]
struct Recorder {
    events: Vec<String>,
    config1_flag: bool,
    config2_flag: bool,
}

#[derive(Default)]
struct Config1;

impl ContainerConfigurer<Recorder, TestSettings> for Config1 {
    fn name(&self) -> UnitName {
        "Config1".into()
    }

    fn configure(&self, container: &mut Recorder, _: &TestSettings) -> UnitResult {
        container.config1_flag = true;
        Ok(())
    }
}

#[derive(Default)]
struct Config2;

impl ContainerConfigurer<Recorder, TestSettings> for Config2 {
    fn name(&self) -> UnitName {
        "Config2".into()
    }

    fn configure(&self, container: &mut Recorder, settings: &TestSettings) -> UnitResult {
        container.config2_flag = settings.is_development();
        Ok(())
    }
}

/// A unit that only records its name, for ordering checks.
struct Named(String);

impl ContainerConfigurer<Recorder, TestSettings> for Named {
    fn name(&self) -> UnitName {
        Cow::Owned(self.0.clone())
    }

    fn configure(&self, container: &mut Recorder, _: &TestSettings) -> UnitResult {
        container.events.push(format!("unit:{}", self.0));
        Ok(())
    }
}

struct Failing;

impl ContainerConfigurer<Recorder, TestSettings> for Failing {
    fn name(&self) -> UnitName {
        "Failing".into()
    }

    fn configure(&self, _: &mut Recorder, _: &TestSettings) -> UnitResult {
        Err("database unreachable".into())
    }
}

fn register_configs(registry: &mut UnitRegistry<Recorder, TestSettings>) {
    registry.register::<Config1>().register::<Config2>();
}

fn named(names: &[&str]) -> Vec<BoxedContainerUnit<Recorder, TestSettings>> {
    names.iter().map(|n| Box::new(Named((*n).to_owned())) as BoxedContainerUnit<_, _>).collect()
}

fn bootstrap_with<F>(excluded: &[&str], discovery: F) -> ContainerBootstrap<Recorder, TestSettings>
where
    F: FnMut() -> Vec<BoxedContainerUnit<Recorder, TestSettings>> + 'static,
{
    let configuration = BootstrapConfiguration::builder()
        .settings(TestSettings)
        .excluded(excluded.iter().copied())
        .build()
        .unwrap();

    ContainerBootstrap::builder()
        .configuration(configuration)
        .container_factory(Recorder::default)
        .discovery(discovery)
        .build()
        .unwrap()
}

#[test]
fn excluded_unit_is_not_configured() {
    let modules = vec![Module::new("configs", register_configs)];
    let excluded: ExclusionSet = ["Config1"].into_iter().collect();
    let mut bootstrap =
        bootstrap_with(&["Config1"], move || discover_container_units(&modules, Some(&excluded)));

    bootstrap.initialize().unwrap();

    assert!(!bootstrap.container().config1_flag);
    assert!(bootstrap.container().config2_flag);
    assert_eq!(bootstrap.state(), BootstrapState::Initialized);
}

#[test]
fn exclusion_is_also_applied_to_already_discovered_units() {
    let modules = vec![Module::new("configs", register_configs)];
    // Discovery does not filter; the bootstrap still honours the configuration.
    let mut bootstrap = bootstrap_with(&["Config1"], move || discover_container_units(&modules, None));

    bootstrap.initialize().unwrap();

    assert!(!bootstrap.container().config1_flag);
    assert!(bootstrap.container().config2_flag);
}

#[test]
fn hooks_wrap_units_in_strict_order() {
    let mut bootstrap = bootstrap_with(&[], || named(&["a", "b"]));
    bootstrap
        .add_pre_initialization_action("pre-1", |c: &mut Recorder| {
            c.events.push("pre:1".into());
            Ok(())
        })
        .add_pre_initialization_action("pre-2", |c: &mut Recorder| {
            c.events.push("pre:2".into());
            Ok(())
        })
        .add_post_initialization_action("post-1", |c: &mut Recorder| {
            c.events.push("post:1".into());
            Ok(())
        });

    bootstrap.initialize().unwrap();

    assert_eq!(bootstrap.container().events, ["pre:1", "pre:2", "unit:a", "unit:b", "post:1"]);
}

#[test]
fn same_hook_registered_twice_runs_once() {
    let mut bootstrap = bootstrap_with(&[], Vec::new);
    for _ in 0..2 {
        bootstrap.add_post_initialization_action("count", |c: &mut Recorder| {
            c.events.push("post".into());
            Ok(())
        });
    }

    bootstrap.initialize().unwrap();

    assert_eq!(bootstrap.container().events, ["post"]);
}

#[test]
fn container_exists_before_initialize() {
    let mut bootstrap = bootstrap_with(&[], || named(&["late"]));
    bootstrap.container_mut().events.push("seeded".into());

    bootstrap.initialize().unwrap();

    assert_eq!(bootstrap.into_container().events, ["seeded", "unit:late"]);
}

#[test]
fn blank_unit_names_are_skipped() {
    let mut bootstrap = bootstrap_with(&[], || named(&["", "kept", "  "]));
    bootstrap.initialize().unwrap();
    assert_eq!(bootstrap.container().events, ["unit:kept"]);
}

#[test]
fn unit_failure_aborts_the_remaining_lifecycle() {
    let mut bootstrap = bootstrap_with(&[], || {
        let mut units = named(&["first"]);
        units.push(Box::new(Failing));
        units.extend(named(&["never"]));
        units
    });
    bootstrap.add_post_initialization_action("post", |c: &mut Recorder| {
        c.events.push("post".into());
        Ok(())
    });

    let err = bootstrap.initialize().unwrap_err();

    assert_eq!(err.kind(), "Unit");
    assert_eq!(err.to_string(), "Configuration unit failed (Failing): database unreachable");
    assert_eq!(bootstrap.container().events, ["unit:first"]);
    assert_eq!(bootstrap.state(), BootstrapState::Failed);
}

#[test]
fn initialize_runs_only_once() {
    let mut bootstrap = bootstrap_with(&[], || named(&["once"]));
    bootstrap.initialize().unwrap();

    let err = bootstrap.initialize().unwrap_err();

    assert!(matches!(err, BootstrapError::AlreadyInitialized { .. }));
    assert_eq!(bootstrap.container().events, ["unit:once"]);
}

#[test]
fn builder_names_each_missing_part() {
    let missing = |result: Result<ContainerBootstrap<Recorder, TestSettings>, BootstrapError>| match result {
        Err(BootstrapError::MissingArgument { name, .. }) => name,
        other => panic!("expected MissingArgument, got {other:?}"),
    };

    assert_eq!(
        missing(ContainerBootstrap::builder().container_factory(Recorder::default).discovery(Vec::new).build()),
        "configuration"
    );
    assert_eq!(
        missing(
            ContainerBootstrap::builder()
                .configuration(BootstrapConfiguration::new(TestSettings))
                .discovery(Vec::new)
                .build()
        ),
        "container_factory"
    );
    assert_eq!(
        missing(
            ContainerBootstrap::builder()
                .configuration(BootstrapConfiguration::new(TestSettings))
                .container_factory(Recorder::default)
                .build()
        ),
        "discovery"
    );
}

proptest! {
    #[test]
    fn excluded_names_never_run_and_others_run_once_in_order(
        mask in prop::collection::vec(any::<bool>(), 0..12),
    ) {
        let names: Vec<String> = (0..mask.len()).map(|i| format!("unit-{i}")).collect();
        let excluded: Vec<&str> =
            names.iter().zip(&mask).filter(|(_, skip)| **skip).map(|(n, _)| n.as_str()).collect();
        let expected: Vec<String> =
            names.iter().zip(&mask).filter(|(_, skip)| !**skip).map(|(n, _)| format!("unit:{n}")).collect();

        let discovered = names.clone();
        let mut bootstrap = bootstrap_with(&excluded, move || {
            discovered.iter().map(|n| Box::new(Named(n.clone())) as BoxedContainerUnit<_, _>).collect()
        });
        bootstrap.initialize().unwrap();

        prop_assert_eq!(&bootstrap.container().events, &expected);
    }
}
