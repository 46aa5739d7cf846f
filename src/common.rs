pub use anyhow::{bail, ensure, format_err, Context, Error, Result as Fallible};
pub use argh::FromArgs;
pub use itertools::Itertools;
pub use log::{debug, error, info, warn};
pub use nalgebra::{Matrix3, Vector3};
pub use ndarray::{concatenate, s, Array1, Array2, Array3, ArrayView1, ArrayView2, Axis};
pub use rayon::prelude::*;
pub use serde::{
    de::Error as DeserializeError, ser::Error as SerializeError, Deserialize, Deserializer,
    Serialize, Serializer,
};
pub use std::{
    borrow::Borrow,
    collections::{BTreeMap, HashMap},
    fmt::Display,
    fs::{self, File},
    io::{self, prelude::*, BufReader},
    iter,
    path::{Path, PathBuf},
};
pub use tch::{CModule, Device, Kind, Tensor};
