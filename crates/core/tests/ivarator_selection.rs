use std::collections::HashSet;

use shardscan_core::err::Error;
use shardscan_core::idx::ivarator::{
	FixedProbe, IvaratorCacheDirConfig, IvaratorCacheDirSelector, LocalFilesystemProbe,
	TimeoutProbe,
};
use url::Url;

const MIB: u64 = 1024 * 1024;

const CONFIGS: &str = r#"[
	{"basePathURI": "hdfs://nn:8020/ivarators/p3", "priority": 3},
	{"basePathURI": "hdfs://nn:8020/ivarators/p1", "priority": 1, "minAvailableStorageMiB": 500},
	{"basePathURI": "hdfs://nn:8020/ivarators/p2", "priority": 2, "minAvailableStoragePercent": 0.25}
]"#;

fn probe() -> FixedProbe {
	FixedProbe::new()
		.with("hdfs://nn:8020/ivarators/p1", 400 * MIB, 10_000 * MIB)
		.with("hdfs://nn:8020/ivarators/p2", 5_000 * MIB, 10_000 * MIB)
		.with("hdfs://nn:8020/ivarators/p3", 10 * MIB, 100 * MIB)
}

#[test_log::test]
fn falls_back_through_the_priorities() {
	let configs = IvaratorCacheDirConfig::from_json_list(CONFIGS).unwrap();
	let selector = IvaratorCacheDirSelector::new(configs, probe()).unwrap();
	let mut session = selector.session();

	// p1 has fewer than 500 MiB available
	let dir = session.select().unwrap();
	assert_eq!(dir.config().priority, 2);
	assert_eq!(dir.capacity().available_mib(), 5_000);

	session.mark_failed(&dir);
	let dir = session.select().unwrap();
	assert_eq!(dir.config().priority, 3);
	assert_eq!(
		dir.query_path("q-1", "s-7").unwrap().as_str(),
		"hdfs://nn:8020/ivarators/p3/q-1/s-7"
	);

	session.mark_failed(&dir);
	assert_eq!(session.failed().len(), 2);
	assert!(matches!(
		session.select(),
		Err(Error::NoEligibleStorage {
			candidates: 3,
			excluded: 2
		})
	));
}

#[test_log::test]
fn exclusions_are_per_call() {
	let configs = IvaratorCacheDirConfig::from_json_list(CONFIGS).unwrap();
	let selector = IvaratorCacheDirSelector::new(configs, probe()).unwrap();
	let excluded = HashSet::from(["hdfs://nn:8020/ivarators/p2".to_owned()]);
	assert_eq!(selector.select(&excluded).unwrap().config().priority, 3);
	assert_eq!(selector.select(&HashSet::new()).unwrap().config().priority, 2);
}

#[test_log::test]
fn configs_written_out_read_back() {
	let configs = IvaratorCacheDirConfig::from_json_list(CONFIGS).unwrap();
	let json = IvaratorCacheDirConfig::to_json_list(&configs).unwrap();
	assert!(json.starts_with('['));
	assert_eq!(IvaratorCacheDirConfig::from_json_list(&json).unwrap(), configs);
}

#[test_log::test]
fn selects_a_local_directory() {
	let dir = tempfile::tempdir().unwrap();
	let uri = Url::from_directory_path(dir.path()).unwrap();
	let configs = [
		IvaratorCacheDirConfig::new("hdfs://nn:8020/ivarators").with_priority(1),
		IvaratorCacheDirConfig::new(uri.as_str()).with_priority(2),
	];
	let probe = TimeoutProbe::new(LocalFilesystemProbe);
	let selector = IvaratorCacheDirSelector::new(configs, probe).unwrap();
	// The remote location cannot be probed locally, so only the temporary directory is left.
	// Hosts without a visible mount table have no eligible directory at all.
	match selector.select(&HashSet::new()) {
		Ok(selected) => assert_eq!(selected.base_path(), &uri),
		Err(e) => assert!(matches!(e, Error::NoEligibleStorage { .. })),
	}
}
