mod context;
mod intern;
mod memory;
mod number;
mod parser;
mod quote;
mod runtime;
mod token;
mod tokenizer;
mod unicode;
mod value;
mod words;

use context::Context;
use directories::ProjectDirs;
use runtime::Runtime;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::env;
use std::fs;
use std::io::{IsTerminal, Read};
use std::path::PathBuf;
use std::process;
use std::rc::Rc;

const EX_USAGE: i32 = 64;

struct Options
{
    script_filename: Option<String>,
    inline_script: String,
    imported_modules: Vec<String>,
    test_syntax: bool,
    fork: bool,
}

fn main()
{
    let args: Vec<String> = env::args().collect();
    let runtime = Runtime::new();

    scan_module_path(&runtime);

    let options = scan_arguments(&runtime, &args);
    let mut ctx = Context::new(&runtime);

    for module in &options.imported_modules
    {
        if !ctx.import(module)
        {
            handle_error(&ctx);
        }
    }

    if let Some(filename) = &options.script_filename
    {
        let bytes = match fs::read(filename)
        {
            Ok(bytes) => bytes,
            Err(_) =>
            {
                eprintln!("{}: Unable to open file `{}' for reading.", args[0], filename);
                process::exit(1);
            }
        };

        ctx.clear();
        ctx.set_filename(filename);
        compile_and_run(&mut ctx, &bytes, filename, &options);
    }
    else if !options.inline_script.is_empty()
    {
        compile_and_run(&mut ctx, options.inline_script.as_bytes(), "-e", &options);
    }
    else if std::io::stdin().is_terminal()
    {
        console_loop(&mut ctx);
    }
    else
    {
        let mut bytes = Vec::new();

        if std::io::stdin().read_to_end(&mut bytes).is_err()
        {
            eprintln!("Unable to read from the standard input.");
            process::exit(1);
        }
        compile_and_run(&mut ctx, &bytes, "<stdin>", &options);
    }
}

fn print_usage(executable: &str)
{
    println!();
    println!("Usage: {} [switches] [--] [programfile] [arguments]", executable);
    println!("  -c           Check syntax only.");
    #[cfg(unix)]
    println!("  -f           Fork to background before executing script.");
    println!("  -e <program> One line of program. (Several -e's allowed, omit programfile.)");
    println!("  -r <path>    Import module before executing script.");
    println!("  --version    Print the version.");
    println!("  --help       Display this message.");
    println!();
}

fn scan_arguments(runtime: &Rc<Runtime>, args: &[String]) -> Options
{
    let mut options = Options {
        script_filename: None,
        inline_script: String::new(),
        imported_modules: Vec::new(),
        test_syntax: false,
        fork: false,
    };
    let mut offset = 1;

    while offset < args.len()
    {
        let arg = &args[offset];

        offset += 1;
        if arg.is_empty()
        {
            continue;
        }
        else if !arg.starts_with('-')
        {
            if options.inline_script.is_empty()
            {
                options.script_filename = Some(arg.clone());
            }
            else
            {
                offset -= 1;
            }
            break;
        }
        else if arg.as_str() == "-"
        {
            break;
        }
        else if let Some(long) = arg.strip_prefix("--")
        {
            match long
            {
                "help" =>
                {
                    print_usage(&args[0]);
                    process::exit(0);
                }
                "version" =>
                {
                    println!("Plorth {}", env!("CARGO_PKG_VERSION"));
                    process::exit(0);
                }
                "" =>
                {
                    if offset < args.len()
                    {
                        options.script_filename = Some(args[offset].clone());
                        offset += 1;
                    }
                    break;
                }
                _ =>
                {
                    eprintln!("Unrecognized switch: {}", arg);
                    print_usage(&args[0]);
                    process::exit(EX_USAGE);
                }
            }
        }
        else
        {
            for flag in arg.chars().skip(1)
            {
                match flag
                {
                    'c' => options.test_syntax = true,
                    'f' => options.fork = true,
                    'e' =>
                    {
                        if offset < args.len()
                        {
                            options.inline_script.push_str(&args[offset]);
                            options.inline_script.push('\n');
                            offset += 1;
                        }
                        else
                        {
                            eprintln!("Argument expected for the -e option.");
                            print_usage(&args[0]);
                            process::exit(EX_USAGE);
                        }
                    }
                    'r' =>
                    {
                        if offset < args.len()
                        {
                            options.imported_modules.push(args[offset].clone());
                            offset += 1;
                        }
                        else
                        {
                            eprintln!("Argument expected for the -r option.");
                            print_usage(&args[0]);
                            process::exit(EX_USAGE);
                        }
                    }
                    'h' =>
                    {
                        print_usage(&args[0]);
                        process::exit(0);
                    }
                    _ =>
                    {
                        eprintln!("Unrecognized switch: `{}'", flag);
                        print_usage(&args[0]);
                        process::exit(EX_USAGE);
                    }
                }
            }
        }
    }

    while offset < args.len()
    {
        runtime.add_argument(&args[offset]);
        offset += 1;
    }
    options
}

/// PLORTHPATH holds a path separator delimited list of module directories,
/// consulted before the compile time default.
fn scan_module_path(runtime: &Rc<Runtime>)
{
    let separator = if cfg!(windows) { ';' } else { ':' };

    if let Ok(value) = env::var("PLORTHPATH")
    {
        for part in value.split(separator)
        {
            if !part.is_empty()
            {
                runtime.add_module_path(PathBuf::from(part));
            }
        }
    }
    if runtime.module_paths().is_empty()
    {
        if let Some(path) = option_env!("PLORTH_RUNTIME_LIBRARY_PATH")
        {
            runtime.add_module_path(PathBuf::from(path));
        }
    }
}

fn handle_error(ctx: &Context) -> !
{
    match ctx.error()
    {
        Some(error) =>
        {
            eprint!("Error: ");
            if let Some(position) = &error.position
            {
                eprint!("{}: ", position);
            }
            eprintln!("{} - {}", error.code, error.message);
        }
        None => eprintln!("Unknown error."),
    }
    process::exit(1);
}

fn compile_and_run(ctx: &mut Context, input: &[u8], filename: &str, options: &Options)
{
    let (source, ok) = unicode::decode_utf8(input);

    if !ok
    {
        eprintln!("Unable to decode source code as UTF-8.");
        process::exit(1);
    }

    let script = match ctx.compile(&source, filename, 1)
    {
        Some(script) => script,
        None => handle_error(ctx),
    };

    if options.test_syntax
    {
        eprintln!("Syntax OK.");
        process::exit(0);
    }
    if options.fork
    {
        fork_to_background();
    }
    if !script.call(ctx)
    {
        handle_error(ctx);
    }
}

#[cfg(unix)]
fn fork_to_background()
{
    if unsafe { libc::fork() } != 0
    {
        process::exit(0);
    }
}

#[cfg(not(unix))]
fn fork_to_background()
{
    eprintln!("Forking to background is not supported on this platform.");
}

// quit ( -- )
fn w_quit(_ctx: &mut Context)
{
    process::exit(0);
}

// .s ( -- )
//
// Displays the contents of the stack, top last.
fn w_show_stack(ctx: &mut Context)
{
    for value in ctx.stack()
    {
        println!("{}", value.to_source());
    }
}

fn initialize_repl_api(runtime: &Rc<Runtime>)
{
    runtime.add_global_word("quit", w_quit);
    runtime.add_global_word(".s", w_show_stack);
}

fn history_path() -> PathBuf
{
    if let Some(dirs) = ProjectDirs::from("org", "plorth", "plorth")
    {
        let data_dir = dirs.data_dir();

        if fs::create_dir_all(data_dir).is_ok()
        {
            return data_dir.join("history.txt");
        }
    }
    PathBuf::from("history.txt")
}

fn console_loop(ctx: &mut Context)
{
    let mut editor = match DefaultEditor::new()
    {
        Ok(editor) => editor,
        Err(error) =>
        {
            eprintln!("Unable to initialize the line editor: {}", error);
            process::exit(1);
        }
    };
    let history = history_path();

    initialize_repl_api(ctx.runtime());
    editor.load_history(&history).ok();

    let mut line_counter = 0u32;
    let mut buffer_start = 1u32;
    let mut source = String::new();
    let mut open_brackets: Vec<char> = Vec::new();

    loop
    {
        line_counter += 1;

        let prompt = format!(
            "plorth:{}:{}{} ",
            line_counter,
            ctx.size(),
            if open_brackets.is_empty() { '>' } else { '*' }
        );
        let line = match editor.readline(&prompt)
        {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(error) =>
            {
                eprintln!("Error: {}", error);
                break;
            }
        };

        if line.is_empty()
        {
            continue;
        }
        editor.add_history_entry(&line).ok();

        if source.is_empty()
        {
            buffer_start = line_counter;
        }
        source.push_str(&line);
        source.push('\n');
        tokenizer::count_open_brackets(&line, &mut open_brackets);

        // Wait for more input while brackets are still open.
        if !open_brackets.is_empty()
        {
            continue;
        }

        if let Some(script) = ctx.compile(&source, "<repl>", buffer_start)
        {
            script.call(ctx);
        }
        source.clear();

        if let Some(error) = ctx.error()
        {
            if let Some(position) = &error.position
            {
                print!("{}: ", position);
            }
            println!("{} - {}", error.code, error.message);
            ctx.clear_error();
        }
    }
    editor.save_history(&history).ok();
}
