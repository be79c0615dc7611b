use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use unicode_normalization::UnicodeNormalization;

use crate::model::{Clipping, EntryType, ParseStats, TagSet};
use crate::util::sha256_hex;

mod blocks;
mod dates;
mod decode;
mod dedup;
mod identity;
mod linking;
mod normalize;
mod patterns;
mod pipeline;

pub use dedup::DedupReport;
pub use identity::{ProbableDuplicate, find_probable_duplicates};
pub use patterns::{DEFAULT_LANGUAGES_FILE, Language, PatternStore};
pub use pipeline::{PipelineOptions, run_pipeline};

use blocks::*;
use dates::*;
use decode::*;
use dedup::*;
use identity::*;
use linking::*;
use normalize::*;
use patterns::*;
use pipeline::*;
