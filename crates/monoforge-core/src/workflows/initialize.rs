use crate::core::builders::chain::ChainPrototype;
use crate::core::builders::dual::DualSurface;
use crate::core::builders::monolayer::SurfaceMonolayer;
use crate::core::builders::pattern::PatternType;
use crate::core::builders::surface::SilicaInterface;
use crate::core::builders::terminal::TerminalGroup;
use crate::core::forcefield::parameterization::Parameterize;
use crate::core::forcefield::params::{CombiningRule, Forcefield, ParamLoadError};
use crate::core::io::gro::{GroFile, GroMetadata};
use crate::core::io::lammps::LammpsDataFile;
use crate::core::io::ndx::NdxFile;
use crate::core::io::top::TopFile;
use crate::core::io::traits::MolecularFile;
use crate::core::models::system::MolecularSystem;
use crate::engine::backbone::Backbone;
use crate::engine::config::InitializationConfig;
use crate::engine::error::EngineError;
use crate::engine::index_groups;
use crate::engine::job::{GRO_FILE, Job, LAMMPS_FILE, NDX_FILE, Statepoint, TOP_FILE};
use crate::engine::progress::{Progress, ProgressReporter};
use nalgebra::Vector3;
use std::path::Path;
use tracing::{debug, info, instrument};

const BOTTOM_NAME: &str = "Bottom";
const TOP_NAME: &str = "Top";

#[derive(Debug, Clone, PartialEq)]
pub struct InitializationReport {
    pub atom_count: usize,
    /// Periodic box written to `init.gro`, in nm.
    pub periodicity: Vector3<f64>,
    /// `false` when `init.top` and `init.lammps` were kept from an earlier run.
    pub forcefield_applied: bool,
}

/// Statepoint values resolved into their typed forms.
struct Recipe {
    backbone: Backbone,
    terminal_group: TerminalGroup,
    pattern: PatternType,
    chain_length: usize,
    n_chains: usize,
    seed: u64,
}

impl Recipe {
    fn resolve(statepoint: &Statepoint) -> Result<Self, EngineError> {
        let backbone = statepoint.backbone.parse::<Backbone>()?;
        let terminal_group = statepoint
            .terminal_group
            .parse::<TerminalGroup>()
            .map_err(|_| EngineError::UnknownTerminalGroup(statepoint.terminal_group.clone()))?;
        let pattern = statepoint
            .pattern_type
            .parse::<PatternType>()
            .map_err(|_| EngineError::UnknownPattern(statepoint.pattern_type.clone()))?;
        Ok(Self {
            backbone,
            terminal_group,
            pattern,
            chain_length: statepoint.chainlength,
            n_chains: statepoint.n,
            seed: statepoint.seed,
        })
    }
}

/// Builds the dual-monolayer system of `job` and writes its four input files.
///
/// `init.gro` and `init.ndx` are always rewritten. The force field is only
/// loaded and applied when `init.top`, `init.lammps` or `init.gro` is
/// missing.
pub fn run(
    job: &Job,
    config: &InitializationConfig,
    reporter: &ProgressReporter,
) -> Result<InitializationReport, EngineError> {
    run_with(job, config, reporter, Forcefield::load)
}

/// Same as [`run`] with a caller-provided force-field loader.
#[instrument(skip_all, name = "initialize_workflow", fields(job = %job.id()))]
pub fn run_with<P, F>(
    job: &Job,
    config: &InitializationConfig,
    reporter: &ProgressReporter,
    load_forcefield: F,
) -> Result<InitializationReport, EngineError>
where
    P: Parameterize,
    F: FnOnce(&Path) -> Result<P, ParamLoadError>,
{
    let recipe = Recipe::resolve(job.statepoint())?;
    info!(
        backbone = %recipe.backbone,
        terminal = %recipe.terminal_group,
        pattern = %recipe.pattern,
        chains = recipe.n_chains,
        "Initializing system"
    );

    let system = reporter.phase("Assembling system", || assemble(&recipe, config))?;

    reporter.phase("Writing coordinates", || -> Result<(), EngineError> {
        let path = job.path(GRO_FILE);
        let metadata = GroMetadata {
            title: format!("{} {}", TOP_NAME, BOTTOM_NAME),
        };
        GroFile::write_to_path(&system, &metadata, &path)?;
        reporter.report(Progress::FileWritten(path));
        Ok(())
    })?;

    let needs_forcefield = [TOP_FILE, LAMMPS_FILE, GRO_FILE]
        .iter()
        .any(|name| !job.path(name).is_file());
    if needs_forcefield {
        reporter.phase("Applying force field", || -> Result<(), EngineError> {
            let forcefield = load_forcefield(&config.forcefield.forcefield_path)?;
            let mut structure = forcefield.apply(&system, config.forcefield.strict_dihedrals)?;
            structure.set_combining_rule(CombiningRule::Geometric);
            info!(
                atoms = structure.atoms.len(),
                bonds = structure.bonds.len(),
                angles = structure.angles.len(),
                dihedrals = structure.dihedrals.len(),
                "Applied force field"
            );

            let top_path = job.path(TOP_FILE);
            TopFile::write_to_path(&structure, job.id(), &top_path)
                .map_err(|e| EngineError::io(&top_path, e))?;
            reporter.report(Progress::FileWritten(top_path));

            let lammps_path = job.path(LAMMPS_FILE);
            LammpsDataFile::write_to_path(&structure, &lammps_path)?;
            reporter.report(Progress::FileWritten(lammps_path));
            Ok(())
        })?;
    } else {
        info!("Topology and LAMMPS data already exist, skipping force field application");
        reporter.report(Progress::PhaseSkipped {
            name: "Applying force field",
        });
    }

    reporter.phase("Writing index groups", || -> Result<(), EngineError> {
        let groups = index_groups::generate(
            &system,
            recipe.terminal_group,
            config.assembly.freeze_thickness,
        );
        let path = job.path(NDX_FILE);
        NdxFile::write_to_path(&groups, &path).map_err(|e| EngineError::io(&path, e))?;
        reporter.report(Progress::FileWritten(path));
        Ok(())
    })?;

    info!(atoms = system.atom_count(), "Initialization complete");
    Ok(InitializationReport {
        atom_count: system.atom_count(),
        periodicity: system.periodicity(),
        forcefield_applied: needs_forcefield,
    })
}

fn assemble(recipe: &Recipe, config: &InitializationConfig) -> Result<MolecularSystem, EngineError> {
    let assembly = &config.assembly;

    let bottom_surface = SilicaInterface::new(assembly.surface_thickness, recipe.seed)?;
    let top_surface = SilicaInterface::new(assembly.surface_thickness, recipe.seed)?;
    let bottom_chain = recipe
        .backbone
        .build_chain(recipe.chain_length, recipe.terminal_group)?;
    let top_chain = recipe
        .backbone
        .build_chain(recipe.chain_length, recipe.terminal_group)?;

    let monolayer = |surface: &SilicaInterface, chain: &ChainPrototype, name: &str| {
        SurfaceMonolayer::builder(surface, chain)
            .n_chains(recipe.n_chains)
            .seed(recipe.seed)
            .pattern(recipe.pattern)
            .rotate(assembly.rotate_chains)
            .name(name)
            .build()
    };
    let bottom = monolayer(&bottom_surface, &bottom_chain, BOTTOM_NAME)?;
    let top = monolayer(&top_surface, &top_chain, TOP_NAME)?;
    debug!(
        chains = bottom.chain_count(),
        backfilled = bottom.backfill_count(),
        "Built monolayers"
    );

    let mut dual = DualSurface::new(&bottom, &top, assembly.separation)?;
    let height = dual
        .bounding_box()
        .map(|b| b.lengths().z)
        .unwrap_or_default();
    dual.extend_periodicity(&Vector3::new(0.0, 0.0, assembly.box_extension_factor * height));

    Ok(dual.into_system())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::forcefield::parameterization::ParameterizationError;
    use crate::core::forcefield::structure::Structure;
    use crate::engine::job::{OUTPUT_FILES, Project, STATEPOINT_FILE};
    use std::fs;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::{TempDir, tempdir};

    struct CountingForcefield {
        inner: Forcefield,
        calls: Arc<AtomicUsize>,
    }

    impl Parameterize for CountingForcefield {
        fn apply(
            &self,
            system: &MolecularSystem,
            strict_dihedrals: bool,
        ) -> Result<Structure, ParameterizationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.apply(system, strict_dihedrals)
        }
    }

    fn statepoint(backbone: &str) -> Statepoint {
        Statepoint {
            chainlength: 3,
            backbone: backbone.to_string(),
            seed: 12,
            pattern_type: "random".to_string(),
            terminal_group: "methyl".to_string(),
            n: 6,
        }
    }

    fn setup(statepoint: Statepoint) -> (TempDir, Job, InitializationConfig) {
        let dir = tempdir().unwrap();
        let project = Project::init(dir.path()).unwrap();
        let job = Job::create(&project, statepoint).unwrap();
        let config = InitializationConfig::builder()
            .forcefield_path(project.default_forcefield_path())
            .build()
            .unwrap();
        (dir, job, config)
    }

    fn counting_run(job: &Job, config: &InitializationConfig) -> (InitializationReport, usize) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let report = run_with(job, config, &ProgressReporter::new(), move |path| {
            Ok(CountingForcefield {
                inner: Forcefield::load(path)?,
                calls: counter,
            })
        })
        .unwrap();
        (report, calls.load(Ordering::SeqCst))
    }

    #[test]
    fn writes_exactly_the_four_outputs() {
        let (_dir, job, config) = setup(statepoint("alkylsilane"));
        let report = run(&job, &config, &ProgressReporter::new()).unwrap();

        assert!(report.forcefield_applied);
        assert!(job.is_complete());
        let mut names: Vec<String> = fs::read_dir(job.workspace())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        let mut expected: Vec<String> = OUTPUT_FILES.iter().map(|s| s.to_string()).collect();
        expected.push(STATEPOINT_FILE.to_string());
        expected.sort();
        assert_eq!(names, expected);

        let (system, _) = GroFile::read_from_path(job.path(GRO_FILE)).unwrap();
        assert_eq!(system.atom_count(), report.atom_count);
        let ndx = NdxFile::read_from_path(job.path(NDX_FILE)).unwrap();
        assert!(!ndx.get("Bottom_chains").unwrap().indices.is_empty());
        assert!(ndx.get("Top_methyl").is_some());
    }

    #[test]
    fn existing_topology_skips_forcefield_but_rewrites_gro_and_ndx() {
        let (_dir, job, config) = setup(statepoint("alkylsilane"));
        let (_, first_calls) = counting_run(&job, &config);
        assert_eq!(first_calls, 1);

        fs::write(job.path(GRO_FILE), "stale").unwrap();
        fs::remove_file(job.path(NDX_FILE)).unwrap();
        let (report, calls) = counting_run(&job, &config);
        assert_eq!(calls, 0);
        assert!(!report.forcefield_applied);
        assert_ne!(fs::read_to_string(job.path(GRO_FILE)).unwrap(), "stale");
        assert!(job.path(NDX_FILE).is_file());

        fs::remove_file(job.path(TOP_FILE)).unwrap();
        let (report, calls) = counting_run(&job, &config);
        assert_eq!(calls, 1);
        assert!(report.forcefield_applied);
        assert!(job.is_complete());
    }

    #[test]
    fn unknown_backbone_fails_before_writing() {
        let (_dir, job, config) = setup(statepoint("polyethylene"));
        let err = run(&job, &config, &ProgressReporter::new()).unwrap_err();
        assert!(matches!(err, EngineError::UnknownBackbone(ref name) if name == "polyethylene"));
        assert!(OUTPUT_FILES.iter().all(|name| !job.path(name).exists()));
    }

    #[test]
    fn unknown_terminal_group_and_pattern_are_rejected() {
        let mut sp = statepoint("alkylsilane");
        sp.terminal_group = "phenyl".to_string();
        let (_dir, job, config) = setup(sp);
        assert!(matches!(
            run(&job, &config, &ProgressReporter::new()),
            Err(EngineError::UnknownTerminalGroup(_))
        ));

        let mut sp = statepoint("alkylsilane");
        sp.pattern_type = "spiral".to_string();
        let (_dir, job, config) = setup(sp);
        assert!(matches!(
            run(&job, &config, &ProgressReporter::new()),
            Err(EngineError::UnknownPattern(_))
        ));
        assert!(!job.path(GRO_FILE).exists());
    }

    #[test]
    fn box_height_is_six_times_the_assembly() {
        let (_dir, job, config) = setup(statepoint("alkylsilane"));
        let report = run(&job, &config, &ProgressReporter::new()).unwrap();
        let (system, _) = GroFile::read_from_path(job.path(GRO_FILE)).unwrap();
        let height = system.bounding_box().unwrap().lengths().z;

        assert!((report.periodicity.z - 6.0 * height).abs() < 0.01);
        assert!((system.periodicity().z - report.periodicity.z).abs() < 1e-4);
    }

    #[test]
    fn same_statepoint_gives_identical_coordinates() {
        let (_dir_a, job_a, config_a) = setup(statepoint("alkylsilane"));
        let (_dir_b, job_b, config_b) = setup(statepoint("alkylsilane"));
        run(&job_a, &config_a, &ProgressReporter::new()).unwrap();
        run(&job_b, &config_b, &ProgressReporter::new()).unwrap();

        assert_eq!(
            fs::read_to_string(job_a.path(GRO_FILE)).unwrap(),
            fs::read_to_string(job_b.path(GRO_FILE)).unwrap()
        );
    }

    #[test]
    fn top_and_bottom_monolayers_are_identical_before_flipping() {
        let recipe = Recipe::resolve(&statepoint("alkylsilane")).unwrap();
        let build = |name: &str| {
            let surface = SilicaInterface::new(1.2, recipe.seed).unwrap();
            let chain = recipe
                .backbone
                .build_chain(recipe.chain_length, recipe.terminal_group)
                .unwrap();
            SurfaceMonolayer::builder(&surface, &chain)
                .n_chains(recipe.n_chains)
                .seed(recipe.seed)
                .pattern(recipe.pattern)
                .rotate(true)
                .name(name)
                .build()
                .unwrap()
        };
        let bottom = build(BOTTOM_NAME);
        let top = build(TOP_NAME);

        assert_eq!(bottom.chain_sites(), top.chain_sites());
        assert_eq!(bottom.chain_count(), recipe.n_chains);
        let positions = |m: &SurfaceMonolayer| {
            m.system()
                .atoms_iter()
                .map(|(_, atom)| atom.position)
                .collect::<Vec<_>>()
        };
        assert_eq!(positions(&bottom), positions(&top));

        let config = InitializationConfig::builder()
            .forcefield_path("unused.toml".into())
            .build()
            .unwrap();
        let system = assemble(&recipe, &config).unwrap();
        let bottom_id = system.find_residue_by_name(BOTTOM_NAME).unwrap();
        let top_id = system.find_residue_by_name(TOP_NAME).unwrap();
        assert_eq!(
            system.residue(bottom_id).unwrap().len(),
            system.residue(top_id).unwrap().len()
        );
    }

    #[test]
    fn reports_phases_and_written_files() {
        let (_dir, job, config) = setup(statepoint("alkylsilane"));
        let events = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let reporter = ProgressReporter::with_callback(Box::new(move |event| {
            sink.lock().unwrap().push(event);
        }));
        run(&job, &config, &reporter).unwrap();

        let events = events.lock().unwrap();
        let written = events
            .iter()
            .filter(|e| matches!(e, Progress::FileWritten(_)))
            .count();
        assert_eq!(written, 4);
        let phases: Vec<&str> = events
            .iter()
            .filter_map(|e| match e {
                Progress::PhaseStart { name } => Some(*name),
                _ => None,
            })
            .collect();
        assert_eq!(
            phases,
            vec![
                "Assembling system",
                "Writing coordinates",
                "Applying force field",
                "Writing index groups"
            ]
        );
    }
}
