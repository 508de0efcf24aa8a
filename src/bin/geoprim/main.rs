//! geoprim CLI - refine a demo scene and report what came out.

use std::collections::BTreeMap;
use std::env;
use std::sync::Arc;
use std::time::Instant;

use geoprim::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse global flags
    let mut level = "warn";
    let mut filtered_args: Vec<&str> = Vec::new();
    for arg in &args[1..] {
        match arg.as_str() {
            "-v" | "--verbose" => level = "debug",
            "-vv" | "--trace" => level = "trace",
            "-q" | "--quiet" => level = "error",
            _ => filtered_args.push(arg),
        }
    }
    init_logging(level);

    match filtered_args.first().copied() {
        None | Some("help" | "h" | "-h" | "--help") => print_help(),
        Some("refine" | "r") => {
            let parms = match filtered_args.get(1) {
                Some(path) => load_parms(path),
                None => RefineParms::new(),
            };
            cmd_refine(&parms);
        }
        Some("parms" | "p") => match RefineParms::new().to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        Some("version" | "--version") => {
            println!("geoprim {} ({})", env!("CARGO_PKG_VERSION"), env!("GEOPRIM_BUILD_DATE"));
        }
        Some(other) => {
            eprintln!("Unknown command: {}", other);
            eprintln!();
            print_help();
            std::process::exit(1);
        }
    }
}

/// `RUST_LOG` wins over the verbosity flags.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_parms(path: &str) -> RefineParms {
    let parsed = std::fs::read_to_string(path)
        .map_err(|e| Error::other(format!("{}: {}", path, e)))
        .and_then(|json| RefineParms::from_json(&json));
    match parsed {
        Ok(parms) => parms,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_help() {
    println!("geoprim - geometry primitive refinement");
    println!();
    println!("USAGE:");
    println!("    geoprim-cli [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    r, refine [parms.json]   Refine the demo scene and print statistics");
    println!("    p, parms                 Print the default refine parameters as JSON");
    println!("    version                  Print version and build date");
    println!("    h, help                  Show this help");
    println!();
    println!("OPTIONS:");
    println!("    -v, --verbose   Debug logging");
    println!("    -vv, --trace    Trace logging");
    println!("    -q, --quiet     Errors only");
    println!();
    println!("RUST_LOG overrides the logging flags.");
}

/// A grid of `n x n` quads in the XZ plane.
fn grid(n: usize) -> PolygonMesh {
    let mut points = Vec::with_capacity((n + 1) * (n + 1));
    for z in 0..=n {
        for x in 0..=n {
            points.push([x as f32, 0.0, z as f32]);
        }
    }
    let row = (n + 1) as i32;
    let mut vertex_list = Vec::with_capacity(n * n * 4);
    for z in 0..n as i32 {
        for x in 0..n as i32 {
            let a = z * row + x;
            vertex_list.extend([a, a + 1, a + row + 1, a + row]);
        }
    }
    let p: DataArrayHandle =
        Arc::new(NumericArray::from_tuples(&points).with_type_info(TypeInfo::Point));
    let faces = n * n;
    let parity: DataArrayHandle = Arc::new(IndexedStringArray::from_strings(
        (0..faces).map(|f| if f % 2 == 0 { "even" } else { "odd" }),
        1,
    ));
    let mesh = PolygonMesh::new(
        CountArray::uniform(faces, 4),
        Arc::new(NumericArray::new(vertex_list, 1)),
        Arc::new(AttributeList::from_arrays([("P", p)])),
    )
    .with_uniform(Arc::new(AttributeList::from_arrays([("parity", parity)])));
    let sets = mesh.face_sets_from_attribute("parity");
    sets.into_iter().fold(mesh, |m, fs| m.with_face_set(fs))
}

fn demo_scene() -> PrimitiveHandle {
    let spheres: Vec<Mat4> = (0..64)
        .map(|i| {
            let offset = Vec3::new((i % 8) as f32 * 3.0, 2.0, (i / 8) as f32 * 3.0);
            Mat4::from_translation(offset) * Mat4::from_scale(Vec3::splat(0.5))
        })
        .collect();
    let ids: DataArrayHandle = Arc::new(RangeArray::new(0, spheres.len() as i64));
    let quadrics = QuadricMesh::from_matrices(QuadricKind::Sphere, &spheres)
        .with_uniform(Arc::new(AttributeList::from_arrays([("id", ids)])));

    let curve_points: DataArrayHandle = Arc::new(RandomArray::with_range(7, 40, 3, -1.0, 1.0));
    let curves = CurveMesh::new(
        CountArray::uniform(10, 4),
        Arc::new(AttributeList::from_arrays([("P", curve_points)])),
    );

    let tube: PrimitiveHandle = Arc::new(Primitive::Quadric(Quadric::new(
        QuadricKind::Tube { taper: 0.25 },
        Mat4::IDENTITY,
    )));
    let copies: Vec<Mat4> = (0..4)
        .map(|i| Mat4::from_translation(Vec3::new(-4.0, i as f32 * 1.5, 0.0)))
        .collect();

    Arc::new(Primitive::Collection(Collection::new(vec![
        Arc::new(Primitive::PolygonMesh(grid(200))),
        Arc::new(Primitive::QuadricMesh(quadrics)),
        Arc::new(Primitive::CurveMesh(curves)),
        Arc::new(Primitive::Instance(Instance::new(tube, copies))),
    ])))
}

fn cmd_refine(parms: &RefineParms) {
    let scene = demo_scene();
    println!("Scene bounds: {:?}", scene.bounds());

    let start = Instant::now();
    let result = refine_primitive(scene, parms);
    let elapsed = start.elapsed();

    let mut kinds: BTreeMap<&str, usize> = BTreeMap::new();
    let mut faces = 0usize;
    let mut face_sets = 0usize;
    let mut bounds = BBox3f::EMPTY;
    for prim in &result.primitives {
        *kinds.entry(prim.kind_name()).or_default() += 1;
        if let Primitive::PolygonMesh(mesh) = prim.as_ref() {
            faces += mesh.face_count();
            face_sets += mesh.face_sets().len();
        }
        bounds.expand_by_box(&prim.bounds());
    }

    println!("Passes:     {}", result.passes);
    println!("Truncated:  {}", result.truncated);
    println!("Primitives: {}", result.primitives.len());
    for (kind, count) in &kinds {
        println!("  {:<14} {}", kind, count);
    }
    println!("Faces:      {}", faces);
    println!("Face sets:  {}", face_sets);
    println!("Bounds:     {:?}", bounds);
    println!("Time:       {:.2?}", elapsed);
}
