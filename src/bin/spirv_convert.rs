use std::path::PathBuf;

use clap::Parser;
use spirv_native_convert::convert::convert_module;
use spirv_native_convert::native::NativeContext;
use spirv_native_convert::spirv::{parse_module, words_from_bytes};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// SPIR-V binary path
    #[clap(value_parser)]
    shader_path: PathBuf,

    /// Name of the generated module
    #[clap(long, value_parser, default_value = "shader")]
    module_name: String,

    /// Print the io struct members and each entry point's interface
    #[clap(long, value_parser)]
    print_interface: bool,

    /// Log at debug level when RUST_LOG isn't set
    #[clap(short, long, value_parser)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let shader = std::fs::read(&args.shader_path).expect("couldn't read file");
    let words = words_from_bytes(&shader).expect("couldn't split shader into words");
    let module = parse_module(&words).expect("couldn't decode SPIR-V");

    let mut ctx = NativeContext::new();
    let converted = match convert_module(&mut ctx, &module, &args.module_name) {
        Ok(converted) => converted,
        Err(e) => {
            eprintln!("conversion failed: {}", e);
            std::process::exit(1);
        }
    };

    print!("{}", ctx.display_module(&converted.module));

    if args.print_interface {
        if let Some(io_struct) = converted.io_struct_type() {
            println!();
            println!("; io struct {}", ctx.display_type(io_struct.native_type()));
            let body = ctx.struct_body(io_struct.native_type()).unwrap_or(&[]);
            for member in io_struct.members().iter() {
                if let Some(index) = member.native_member_index {
                    println!(";   {}: {} {:?}", index, ctx.display_type(body[index]), member.decorations);
                }
            }
        }
        for entry_point in &converted.entry_points {
            println!(
                "; entry point '{}' ({:?}) interface members {:?} local size {:?}",
                entry_point.name, entry_point.execution_model, entry_point.interface_members, entry_point.local_size
            );
        }
    }
}
