use crate::cli::{MapArgs, OutputFormat, TajimaArgs};
use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use structmap::core::models::atom::AtomSelector;
use structmap::engine::config::{
    self as core_config, MappingConfigBuilder, TajimaConfig, TajimaConfigBuilder,
};
use structmap::engine::error::EngineError;
use tracing::debug;

const DEFAULT_METHOD: &str = "default";
const DEFAULT_DELIMITER: char = ',';
const DEFAULT_MISSING_VALUE: f64 = 0.0;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialMappingConfig {
    method: Option<String>,
    radius: Option<f64>,
    selector: Option<String>,
    reference: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialTajimaConfig {
    window: Option<usize>,
    step: Option<usize>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialOutputConfig {
    format: Option<OutputFormat>,
    delimiter: Option<char>,
    default_value: Option<f64>,
}

/// Settings read from a TOML file; every key is optional.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    mapping: Option<PartialMappingConfig>,
    tajima: Option<PartialTajimaConfig>,
    output: Option<PartialOutputConfig>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputSettings {
    pub format: OutputFormat,
    pub delimiter: u8,
    pub default_value: f64,
}

/// Fully merged settings for the `map` command. The reference is still a path; the
/// command reads it before building the library's `MappingConfig`.
#[derive(Debug, Clone, PartialEq)]
pub struct MapSettings {
    pub builder: MappingConfigBuilder,
    pub reference: Option<PathBuf>,
    pub output: OutputSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TajimaSettings {
    pub config: TajimaConfig,
    pub delimiter: u8,
}

impl PartialConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Reads `path` if given; an absent file means an empty configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::from_file)
    }

    pub fn merge_map_args(mut self, args: &MapArgs) -> Result<MapSettings> {
        self.apply_set_values(&args.set_values)?;
        let mapping = self.mapping.take().unwrap_or_default();
        let output = self.output.take().unwrap_or_default();

        let method = args
            .method
            .clone()
            .or(mapping.method)
            .unwrap_or_else(|| DEFAULT_METHOD.to_string());
        let radius = args
            .radius
            .or(mapping.radius)
            .unwrap_or(core_config::DEFAULT_RADIUS);
        let selector = args
            .selector
            .as_deref()
            .or(mapping.selector.as_deref())
            .map(|s| AtomSelector::from_str(s).unwrap_or_default())
            .unwrap_or_default();

        let builder = MappingConfigBuilder::new()
            .method(&method)
            .radius(radius)
            .selector(selector);
        // Validate early, before any file is read.
        builder.clone().build().map_err(EngineError::from)?;

        Ok(MapSettings {
            builder,
            reference: args.reference.clone().or(mapping.reference),
            output: OutputSettings {
                format: args.format.or(output.format).unwrap_or_default(),
                delimiter: delimiter_byte(args.delimiter.or(output.delimiter))?,
                default_value: args
                    .default_value
                    .or(output.default_value)
                    .unwrap_or(DEFAULT_MISSING_VALUE),
            },
        })
    }

    pub fn merge_tajima_args(mut self, args: &TajimaArgs) -> Result<TajimaSettings> {
        self.apply_set_values(&args.set_values)?;
        let tajima = self.tajima.take().unwrap_or_default();
        let output = self.output.take().unwrap_or_default();

        let config = TajimaConfigBuilder::new()
            .window(args.window.or(tajima.window))
            .step(
                args.step
                    .or(tajima.step)
                    .unwrap_or(core_config::DEFAULT_STEP),
            )
            .build()
            .map_err(EngineError::from)?;

        Ok(TajimaSettings {
            config,
            delimiter: delimiter_byte(args.delimiter.or(output.delimiter))?,
        })
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };
            let invalid = |kind: &str| {
                CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value_str))
            };

            match key {
                "mapping.method" => {
                    self.mapping.get_or_insert_with(Default::default).method =
                        Some(value_str.to_string());
                }
                "mapping.radius" => {
                    self.mapping.get_or_insert_with(Default::default).radius =
                        Some(value_str.parse().map_err(|_| invalid("float"))?);
                }
                "mapping.selector" => {
                    self.mapping.get_or_insert_with(Default::default).selector =
                        Some(value_str.to_string());
                }
                "mapping.reference" => {
                    self.mapping.get_or_insert_with(Default::default).reference =
                        Some(PathBuf::from(value_str));
                }
                "tajima.window" => {
                    self.tajima.get_or_insert_with(Default::default).window =
                        Some(value_str.parse().map_err(|_| invalid("integer"))?);
                }
                "tajima.step" => {
                    self.tajima.get_or_insert_with(Default::default).step =
                        Some(value_str.parse().map_err(|_| invalid("integer"))?);
                }
                "output.format" => {
                    self.output.get_or_insert_with(Default::default).format = Some(
                        <OutputFormat as clap::ValueEnum>::from_str(value_str, true)
                            .map_err(|_| invalid("format"))?,
                    );
                }
                "output.delimiter" => {
                    self.output.get_or_insert_with(Default::default).delimiter =
                        Some(value_str.parse().map_err(|_| invalid("character"))?);
                }
                "output.default-value" => {
                    self.output.get_or_insert_with(Default::default).default_value =
                        Some(value_str.parse().map_err(|_| invalid("float"))?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn delimiter_byte(delimiter: Option<char>) -> Result<u8> {
    let delimiter = delimiter.unwrap_or(DEFAULT_DELIMITER);
    u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| {
            CliError::Argument(format!("Delimiter must be an ASCII character, got '{}'", delimiter))
        })
}
