use std::io::Write;
use std::path::Path;

const SHADER_DIR: &str = "assets/shaders";

fn shader_kind(path: &Path) -> Option<shaderc::ShaderKind> {
    match path.extension()?.to_str()? {
        "vert" => Some(shaderc::ShaderKind::Vertex),
        "frag" => Some(shaderc::ShaderKind::Fragment),
        _ => None,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed={}", SHADER_DIR);
    let out_dir = std::env::var("OUT_DIR")?;
    std::fs::create_dir_all(&out_dir)?;

    let mut compiler = shaderc::Compiler::new().ok_or("failed to create shaderc compiler")?;
    let mut options = shaderc::CompileOptions::new().ok_or("failed to create shaderc options")?;
    options.set_optimization_level(shaderc::OptimizationLevel::Performance);

    for entry in std::fs::read_dir(SHADER_DIR)? {
        let in_path = entry?.path();
        let kind = match shader_kind(&in_path) {
            Some(kind) => kind,
            None => continue,
        };
        let in_filename = in_path
            .file_name()
            .ok_or("shader path has no file name")?
            .to_string_lossy()
            .into_owned();
        let out_path = Path::new(&out_dir).join(format!("{}.spv", in_filename));
        println!("cargo:rerun-if-changed={}", in_path.display());

        let source = std::fs::read_to_string(&in_path)?;
        let spirv =
            compiler.compile_into_spirv(&source, kind, &in_filename, "main", Some(&options))?;
        std::fs::File::create(&out_path)?.write_all(spirv.as_binary_u8())?;
    }
    Ok(())
}
