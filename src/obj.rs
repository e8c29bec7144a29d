use std::{io::BufRead, path::Path};

use glam::DVec3;

use crate::{error::Error, mesh::Mesh};

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        triangulate: true,
        ..Default::default()
    }
}

fn mesh_from_models(models: Vec<tobj::Model>) -> Result<Mesh, Error> {
    let mut points = Vec::new();
    let mut triangles = Vec::new();
    for model in models {
        let mesh = model.mesh;
        if mesh.positions.len() % 3 != 0 {
            return Err(Error::IncorrectNumberOfCoordinates(mesh.positions.len()));
        }
        if mesh.indices.len() % 3 != 0 {
            return Err(Error::IncorrectIndexCount(mesh.indices.len()));
        }
        let offset = points.len() as u32;
        points.extend(
            mesh.positions
                .chunks_exact(3)
                .map(|xyz| DVec3::new(xyz[0], xyz[1], xyz[2])),
        );
        triangles.extend(
            mesh.indices
                .chunks_exact(3)
                .map(|tri| [tri[0] + offset, tri[1] + offset, tri[2] + offset]),
        );
    }
    Mesh::from_triangles(&points, &triangles)
}

impl Mesh {
    /// Load a mesh from a Wavefront OBJ file. Polygons are triangulated, and
    /// materials, normals and texture coordinates are ignored.
    pub fn load_obj(path: &Path) -> Result<Self, Error> {
        let (models, _) = tobj::load_obj(path, &load_options())
            .map_err(|e| Error::ObjLoadFailed(format!("{}: {e}", path.display())))?;
        mesh_from_models(models)
    }

    /// Load a mesh from OBJ data read from `reader`. Material libraries
    /// referenced by the data are not loaded.
    pub fn load_obj_buf(reader: &mut impl BufRead) -> Result<Self, Error> {
        let (models, _) = tobj::load_obj_buf(reader, &load_options(), |_| {
            Err(tobj::LoadError::OpenFileFailed)
        })
        .map_err(|e| Error::ObjLoadFailed(e.to_string()))?;
        mesh_from_models(models)
    }
}
