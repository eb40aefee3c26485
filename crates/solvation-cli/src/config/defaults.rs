use solvation::engine::config::AnalysisKind;

pub struct DefaultsConfig {
    pub default_radius: f64,
    pub timestep: f64,
    pub analyses: Vec<AnalysisKind>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            default_radius: 3.0,
            timestep: 1.0,
            analyses: vec![
                AnalysisKind::Speciation,
                AnalysisKind::Coordination,
                AnalysisKind::Pairing,
                AnalysisKind::Residence,
            ],
        }
    }
}
