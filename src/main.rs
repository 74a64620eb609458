use std::thread;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use log::{debug, info};

use terrastream::config::{CliArgs, TerrainConfig};
use terrastream::session::TerrainSession;
use terrastream::streamer::MeshSink;
use terrastream::terrain::{fdf, TerrainMesh, Vertex};

/// Stand-in for a renderer: reports what it would upload.
#[derive(Default)]
struct LogSink {
    updates: u64,
}

impl MeshSink for LogSink {
    fn mesh_changed(&mut self, mesh: &TerrainMesh) {
        self.updates += 1;
        let vertices = mesh.interleaved();
        let vertex_bytes: &[u8] = bytemuck::cast_slice(&vertices);
        let normals = mesh.compute_normals();
        debug!(
            "Mesh update {}: {} vertices ({} bytes at stride {}), {} indices, {} normals",
            self.updates,
            vertices.len(),
            vertex_bytes.len(),
            Vertex::desc().array_stride,
            mesh.indices.len(),
            normals.len()
        );
    }

    fn static_mesh_ready(&mut self, mesh: &TerrainMesh) {
        info!(
            "Navigation bake requested for {} triangles",
            mesh.indices.len() / 3
        );
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args = CliArgs::parse();

    let mut config = match &args.config {
        Some(path) => TerrainConfig::load(path)?,
        None => TerrainConfig::default(),
    };
    config.apply_cli_overrides(&args);

    let mut session = TerrainSession::new(&config)?;
    let mut sink = LogSink::default();
    session.start(&mut sink)?;

    let grid = session.grid();
    println!(
        "Generated terrain: {}x{} cells, {} vertices, {} indices",
        grid.width(),
        grid.depth(),
        grid.vertex_count(),
        grid.indices().len()
    );

    if config.continuous {
        let period = session.streamer().period();
        let mut streamed = 0;
        let mut last = Instant::now();

        while streamed < args.ticks {
            thread::sleep(period);
            let now = Instant::now();
            streamed += session.update(now - last, &mut sink)?;
            last = now;
        }
        session.stop();

        println!(
            "Streamed {} rows, next logical row {}",
            streamed,
            session.grid().row_cursor()
        );
    }

    if let Some(path) = &args.output {
        fdf::write_fdf(path, session.grid())?;
    }

    Ok(())
}
