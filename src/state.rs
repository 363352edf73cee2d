use std::path::Path;
use std::sync::Arc;

use campaign_dashboard::config::DashboardConfig;
use campaign_dashboard::{
    apply, global_kpis, AggregateResult, CategoricalField, Dataset, DatasetCache, FilterChoices,
    FilterSelection, GlobalKpis,
};

use crate::color::ColorMap;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Datasets loaded this session, keyed by path.
    pub cache: DatasetCache,

    /// Loaded dataset (None until the user loads a file).
    pub dataset: Option<Arc<Dataset>>,

    /// KPIs over the whole dataset; computed once per dataset.
    pub global: Option<GlobalKpis>,

    /// Selector vocabularies of the loaded dataset.
    pub choices: FilterChoices,

    pub selection: FilterSelection,

    /// Aggregates for the current selection.
    pub result: Option<AggregateResult>,

    pub job_colors: ColorMap,
    pub education_colors: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            cache: DatasetCache::new(),
            dataset: None,
            global: None,
            choices: FilterChoices::default(),
            selection: FilterSelection::all(),
            result: None,
            job_colors: ColorMap::new(&[]),
            education_colors: ColorMap::new(&[]),
            status_message: None,
        }
    }

    /// Load `path` (through the cache) and make it the active dataset.
    /// Failures leave the previous dataset in place and set the status line.
    pub fn open(&mut self, path: &Path) {
        let delimiter = match self.config.delimiter_byte() {
            Ok(d) => d,
            Err(e) => {
                self.status_message = Some(format!("Error: {e:#}"));
                return;
            }
        };

        match self.cache.get_or_load(path, delimiter) {
            Ok(dataset) => {
                log::info!("Opened {} ({} records)", path.display(), dataset.len());
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load file: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Ingest a loaded dataset: global KPIs, selector vocabularies, colours.
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        self.global = Some(global_kpis(&dataset));
        self.choices = FilterChoices::from_dataset(&dataset);
        self.job_colors = ColorMap::new(&self.choices.jobs);
        self.education_colors = ColorMap::new(&self.choices.educations);
        self.selection = FilterSelection::all();
        self.dataset = Some(dataset);
        self.status_message = None;
        self.refresh();
    }

    /// Change one selector and recompute the aggregates.
    pub fn set_filter(&mut self, field: CategoricalField, value: Option<String>) {
        if self.selection.get(field) == value.as_deref() {
            return;
        }
        self.selection.set(field, value);
        self.refresh();
    }

    pub fn reset_filters(&mut self) {
        self.selection = FilterSelection::all();
        self.refresh();
    }

    /// Recompute `result` from the dataset and the current selection.
    pub fn refresh(&mut self) {
        self.result = self
            .dataset
            .as_deref()
            .map(|ds| apply(ds, &self.selection));
    }
}
