//! In-memory [`ParamStore`].

use spotx_types::{MarketParams, Result};

use crate::expected_keepers::ParamStore;

/// Holds the market module's parameter set.
#[derive(Debug, Clone, Default)]
pub struct ParamSubspace {
    params: MarketParams,
}

impl ParamSubspace {
    /// Start from a validated parameter set.
    pub fn new(params: MarketParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    /// Load and validate parameters from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self {
            params: MarketParams::from_json(json)?,
        })
    }
}

impl ParamStore for ParamSubspace {
    fn params(&self) -> MarketParams {
        self.params.clone()
    }

    fn set_params(&mut self, params: MarketParams) -> Result<()> {
        params.validate()?;
        tracing::info!(
            chain_id_version = params.chain_id_version,
            fee_rate = %params.fee_rate(),
            "market params updated"
        );
        self.params = params;
        Ok(())
    }
}
