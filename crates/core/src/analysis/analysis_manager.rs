//! Owner of the scanned ledger and the cache of built analyses.

use dashmap::DashMap;
use log::{debug, info};
use std::sync::{Arc, RwLock};

use crate::errors::{Error, Result};
use crate::ledger::{MarketSeriesTrait, ReferenceData, ReferenceDataTrait, TransactionFeedTrait};
use crate::market_data::MarketSeries;
use crate::settings::AnalysisSettings;

use super::analysis_key::AnalysisKey;
use super::analysis_model::Analysis;
use super::analysis_pipeline::{build_analysis, PipelineContext};
use super::ledger_scanner::{LedgerScanner, ScannedLedger};

/// Everything derived from one read of the providers.
struct ManagerState {
    reference: ReferenceData,
    market: MarketSeries,
    scanned: ScannedLedger,
    canonical: Arc<Analysis>,
    base_scale: u32,
}

impl ManagerState {
    fn context<'a>(&'a self, settings: &'a AnalysisSettings) -> PipelineContext<'a> {
        PipelineContext {
            reference: &self.reference,
            market: &self.market,
            settings,
            base_scale: self.base_scale,
        }
    }
}

pub struct AnalysisManager {
    settings: AnalysisSettings,
    reference_provider: Arc<dyn ReferenceDataTrait>,
    feed: Arc<dyn TransactionFeedTrait>,
    market_provider: Arc<dyn MarketSeriesTrait>,
    state: RwLock<ManagerState>,
    cache: DashMap<AnalysisKey, Arc<Analysis>>,
}

impl AnalysisManager {
    /// Validates the settings, reads every provider once, scans the feed and
    /// builds the canonical full analysis.
    pub fn new(
        settings: AnalysisSettings,
        reference_provider: Arc<dyn ReferenceDataTrait>,
        feed: Arc<dyn TransactionFeedTrait>,
        market_provider: Arc<dyn MarketSeriesTrait>,
    ) -> Result<Self> {
        settings.validate()?;
        let state = Self::load_state(
            &settings,
            reference_provider.as_ref(),
            feed.as_ref(),
            market_provider.as_ref(),
        )?;
        Ok(AnalysisManager {
            settings,
            reference_provider,
            feed,
            market_provider,
            state: RwLock::new(state),
            cache: DashMap::new(),
        })
    }

    fn load_state(
        settings: &AnalysisSettings,
        reference_provider: &dyn ReferenceDataTrait,
        feed: &dyn TransactionFeedTrait,
        market_provider: &dyn MarketSeriesTrait,
    ) -> Result<ManagerState> {
        let reference = ReferenceData::load(reference_provider, settings.default_scale)?;
        let base_scale = reference.currency_scale(&settings.base_currency);
        let market = MarketSeries::new(
            &settings.base_currency,
            market_provider.list_exchange_rates()?,
            market_provider.list_quotes()?,
        );
        let transactions = feed.list_transactions()?;

        let scanned =
            LedgerScanner::new(&reference, &market, settings, base_scale).scan(&transactions)?;
        let canonical = {
            let context = PipelineContext {
                reference: &reference,
                market: &market,
                settings,
                base_scale,
            };
            Arc::new(build_analysis(&context, &scanned, AnalysisKey::Full)?)
        };
        info!(
            "Analysed {} transactions ({} skipped) across {} accounts in {}",
            scanned.applied_count,
            scanned.warnings.len(),
            reference.accounts().len(),
            settings.base_currency
        );

        Ok(ManagerState {
            reference,
            market,
            scanned,
            canonical,
            base_scale,
        })
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    /// The full analysis built at construction or by the last `reanalyze`.
    pub fn canonical(&self) -> Result<Arc<Analysis>> {
        let state = self
            .state
            .read()
            .map_err(|e| Error::Unexpected(format!("Analysis state lock poisoned: {}", e)))?;
        Ok(Arc::clone(&state.canonical))
    }

    /// Returns the analysis for `key`, building and caching it on first
    /// request. Concurrent first requests for the same key build it once.
    pub fn get_analysis(&self, key: AnalysisKey) -> Result<Arc<Analysis>> {
        key.validate()?;
        if key == AnalysisKey::Full {
            return self.canonical();
        }
        if let Some(cached) = self.cache.get(&key) {
            return Ok(Arc::clone(cached.value()));
        }

        let state = self
            .state
            .read()
            .map_err(|e| Error::Unexpected(format!("Analysis state lock poisoned: {}", e)))?;
        let entry = self.cache.entry(key).or_try_insert_with(|| {
            debug!("Analysis cache miss for {}", key);
            build_analysis(&state.context(&self.settings), &state.scanned, key).map(Arc::new)
        })?;
        Ok(Arc::clone(entry.value()))
    }

    /// Re-reads every provider, rebuilds the canonical analysis and drops
    /// all cached ones. On failure the previous state stays in place.
    pub fn reanalyze(&self) -> Result<Arc<Analysis>> {
        let fresh = Self::load_state(
            &self.settings,
            self.reference_provider.as_ref(),
            self.feed.as_ref(),
            self.market_provider.as_ref(),
        )?;
        let canonical = Arc::clone(&fresh.canonical);

        let mut state = self
            .state
            .write()
            .map_err(|e| Error::Unexpected(format!("Analysis state lock poisoned: {}", e)))?;
        *state = fresh;
        let dropped = self.cache.len();
        self.cache.clear();
        debug!("Reanalyzed; dropped {} cached analyses", dropped);
        Ok(canonical)
    }

    /// Keys currently held in the cache, in key order.
    pub fn cached_keys(&self) -> Vec<AnalysisKey> {
        let mut keys: Vec<AnalysisKey> = self.cache.iter().map(|entry| *entry.key()).collect();
        keys.sort();
        keys
    }
}
