//! Field snapshots and their on-disk containers.
//!
//! A snapshot holds the vorticity `omega` and/or the velocity `u`, both of
//! shape `(3, n, n, n)`, together with the scalar attributes `nu`, `t` and `L`.
//! Containers are serde encoded; the encoding is chosen by file extension.

use crate::consts::{DEFAULT_DOMAIN_LENGTH, DEFAULT_TIME, DEFAULT_VISCOSITY};
use crate::errors::*;
use crate::mesh::Grid;
use crate::spectral::{SpectralDerivative, VectorField3D};
use log::debug;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    #[serde(default)]
    pub omega: Option<VectorField3D>,
    #[serde(default)]
    pub u: Option<VectorField3D>,
    #[serde(default = "default_viscosity")]
    pub nu: f64,
    #[serde(default = "default_time")]
    pub t: f64,
    #[serde(rename = "L", default = "default_domain_length")]
    pub domain_length: f64,
}

fn default_viscosity() -> f64 {
    DEFAULT_VISCOSITY
}

fn default_time() -> f64 {
    DEFAULT_TIME
}

fn default_domain_length() -> f64 {
    DEFAULT_DOMAIN_LENGTH
}

/// Returns the number of grid points per axis of `v`.
fn field_size(v: &VectorField3D, name: &str) -> Result<usize> {
    let sh = v.shape();
    if sh[0] != 3 {
        bail!(ErrorKind::MalformedField(format!(
            "dataset `{}` must have 3 components, got {}",
            name, sh[0]
        )));
    }

    if sh[1] != sh[2] || sh[2] != sh[3] {
        bail!(ErrorKind::MalformedField(format!(
            "dataset `{}` must live on a cubic grid, got shape {:?}",
            name, sh
        )));
    }

    if sh[1] == 0 {
        bail!(ErrorKind::MalformedField(format!(
            "dataset `{}` is empty",
            name
        )));
    }

    Ok(sh[1])
}

impl Snapshot {
    /// Creates a snapshot with default attributes. At least one of `omega` and
    /// `u` must be given, and both must share a grid.
    pub fn new(omega: Option<VectorField3D>, u: Option<VectorField3D>) -> Result<Snapshot> {
        let s = Snapshot {
            omega,
            u,
            nu: DEFAULT_VISCOSITY,
            t: DEFAULT_TIME,
            domain_length: DEFAULT_DOMAIN_LENGTH,
        };
        s.grid()?;

        Ok(s)
    }

    pub fn from_velocity(u: VectorField3D) -> Result<Snapshot> {
        Snapshot::new(None, Some(u))
    }

    pub fn from_vorticity(omega: VectorField3D) -> Result<Snapshot> {
        Snapshot::new(Some(omega), None)
    }

    pub fn with_nu(mut self, nu: f64) -> Snapshot {
        self.nu = nu;
        self
    }

    pub fn with_time(mut self, t: f64) -> Snapshot {
        self.t = t;
        self
    }

    pub fn with_domain_length(mut self, length: f64) -> Result<Snapshot> {
        self.domain_length = length;
        self.grid()?;
        Ok(self)
    }

    /// Validates the datasets and returns the grid they are sampled on.
    pub fn grid(&self) -> Result<Grid> {
        let n = match (&self.omega, &self.u) {
            (None, None) => bail!(ErrorKind::MissingField),
            (Some(w), None) => field_size(w, "omega")?,
            (None, Some(u)) => field_size(u, "u")?,
            (Some(w), Some(u)) => {
                let nw = field_size(w, "omega")?;
                let nu = field_size(u, "u")?;
                if nw != nu {
                    bail!(ErrorKind::MalformedField(format!(
                        "`omega` and `u` live on different grids, {} != {}",
                        nw, nu
                    )));
                }
                nw
            }
        };

        Grid::new(n, self.domain_length)
    }

    pub fn velocity(&self) -> Option<&VectorField3D> {
        self.u.as_ref()
    }

    /// Returns the stored vorticity, or the curl of the velocity if only `u`
    /// is present.
    pub fn vorticity(&self, ops: &SpectralDerivative) -> Result<Cow<VectorField3D>> {
        match (&self.omega, &self.u) {
            (Some(w), _) => {
                ops.check_vector(&w.view())?;
                Ok(Cow::Borrowed(w))
            }
            (None, Some(u)) => {
                debug!("Computing vorticity from velocity.");
                Ok(Cow::Owned(ops.curl(u.view())?))
            }
            (None, None) => bail!(ErrorKind::MissingField),
        }
    }
}

/// Supported container encodings.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContainerFormat {
    CBOR,
    Bincode,
    MsgPack,
}

impl ContainerFormat {
    pub fn from_path(path: &Path) -> Result<ContainerFormat> {
        let ext = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => ext,
            None => bail!(ErrorKind::UnknownFormat(format!(
                "<none> in '{}'",
                path.display()
            ))),
        };

        match ext {
            "cbor" => Ok(ContainerFormat::CBOR),
            "bincode" => Ok(ContainerFormat::Bincode),
            "msgpack" => Ok(ContainerFormat::MsgPack),
            _ => bail!(ErrorKind::UnknownFormat(ext.to_string())),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ContainerFormat::CBOR => "cbor",
            ContainerFormat::Bincode => "bincode",
            ContainerFormat::MsgPack => "msgpack",
        }
    }
}

/// Reads a snapshot container. The encoding is chosen by file extension.
pub fn read_snapshot(path: &Path) -> Result<Snapshot> {
    let format = ContainerFormat::from_path(path)?;

    let f = File::open(path).chain_err(|| format!("Unable to open file '{}'.", path.display()))?;
    let r = BufReader::new(f);

    let snapshot: Snapshot = match format {
        ContainerFormat::CBOR => {
            serde_cbor::from_reader(r).chain_err(|| "CBOR, cannot decode given file.")?
        }
        ContainerFormat::Bincode => {
            bincode::deserialize_from(r).chain_err(|| "Bincode, cannot decode given file.")?
        }
        ContainerFormat::MsgPack => {
            rmp_serde::from_read(r).chain_err(|| "MsgPack, cannot decode given file.")?
        }
    };

    snapshot
        .grid()
        .chain_err(|| format!("Invalid snapshot in '{}'.", path.display()))?;

    Ok(snapshot)
}

/// Writes a snapshot container. The encoding is chosen by file extension.
pub fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<()> {
    let format = ContainerFormat::from_path(path)?;

    let f = File::create(path)
        .chain_err(|| format!("Cannot create snapshot file '{}'.", path.display()))?;
    let mut w = BufWriter::new(f);

    match format {
        ContainerFormat::CBOR => serde_cbor::to_writer(&mut w, snapshot)
            .chain_err(|| "Cannot write snapshot (CBOR).")?,
        ContainerFormat::Bincode => bincode::serialize_into(&mut w, snapshot)
            .chain_err(|| "Cannot write snapshot (Bincode).")?,
        ContainerFormat::MsgPack => rmp_serde::encode::write_named(&mut w, snapshot)
            .chain_err(|| "Cannot write snapshot (MsgPack).")?,
    }

    w.flush()
        .chain_err(|| format!("Unable to flush snapshot to '{}'.", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::TWOPI;
    use ndarray::Array;
    use std::env;
    use std::fs;

    fn field(n: usize) -> VectorField3D {
        Array::from_shape_fn((3, n, n, n), |(c, i, j, k)| {
            (c * 1000 + i * 100 + j * 10 + k) as f64
        })
    }

    #[test]
    fn test_snapshot_validation() {
        assert!(Snapshot::new(None, None).is_err());
        assert!(Snapshot::from_vorticity(Array::zeros((2, 4, 4, 4))).is_err());
        assert!(Snapshot::from_velocity(Array::zeros((3, 4, 4, 5))).is_err());
        assert!(Snapshot::new(Some(field(4)), Some(field(6))).is_err());
        assert!(Snapshot::from_velocity(field(4))
            .unwrap()
            .with_domain_length(0.)
            .is_err());

        let s = Snapshot::new(Some(field(4)), Some(field(4))).unwrap();
        assert_eq!(s.grid().unwrap(), Grid::new(4, TWOPI).unwrap());
        assert_eq!(s.nu, 1.);
        assert_eq!(s.t, 0.);
    }

    #[test]
    fn test_missing_datasets() {
        match Snapshot::new(None, None).unwrap_err().kind() {
            ErrorKind::MissingField => {}
            k => panic!("unexpected error {:?}", k),
        }
    }

    #[test]
    fn test_vorticity_prefers_stored_field() {
        let s = Snapshot::new(Some(field(4)), Some(Array::zeros((3, 4, 4, 4)))).unwrap();
        let ops = SpectralDerivative::new(s.grid().unwrap());

        match s.vorticity(&ops).unwrap() {
            Cow::Borrowed(w) => assert_eq!(w, &field(4)),
            Cow::Owned(_) => panic!("vorticity should not be recomputed"),
        }

        let s = Snapshot::from_velocity(Array::zeros((3, 4, 4, 4))).unwrap();
        let w = s.vorticity(&ops).unwrap();
        assert!(w.iter().all(|&v| v == 0.));
    }

    #[test]
    fn test_container_formats() {
        assert_eq!(
            ContainerFormat::from_path(Path::new("a/b.cbor")).unwrap(),
            ContainerFormat::CBOR
        );
        assert_eq!(
            ContainerFormat::from_path(Path::new("b.msgpack")).unwrap(),
            ContainerFormat::MsgPack
        );
        assert!(ContainerFormat::from_path(Path::new("b.h5")).is_err());
        assert!(ContainerFormat::from_path(Path::new("b")).is_err());
    }

    #[test]
    fn test_write_and_read_snapshot() {
        let dir = env::temp_dir().join(format!("vortexsublevel-snapshot-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let s = Snapshot::from_vorticity(field(3))
            .unwrap()
            .with_nu(0.01)
            .with_time(2.5)
            .with_domain_length(3.)
            .unwrap();

        for f in &[
            ContainerFormat::CBOR,
            ContainerFormat::Bincode,
            ContainerFormat::MsgPack,
        ] {
            let path = dir.join(format!("snapshot.{}", f.extension()));
            write_snapshot(&path, &s).unwrap();
            assert_eq!(read_snapshot(&path).unwrap(), s);
        }

        fs::remove_dir_all(&dir).unwrap();
    }
}
