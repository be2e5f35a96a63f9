use argh::FromArgs;
use minish::Interpreter;

#[derive(FromArgs)]
/// A line-oriented command interpreter with aliases, history, chained
/// commands and an arbitrary-precision calculator.
struct Cli {
    /// run a single command line and exit
    #[argh(option, short = 'c')]
    command: Option<String>,
}

fn main() {
    let cli: Cli = argh::from_env();
    let mut interpreter = Interpreter::default();

    if let Some(line) = cli.command {
        let ok = interpreter.run_line(&line);
        std::process::exit(if ok { 0 } else { 1 });
    }

    println!("Welcome to minish!");
    println!("Available commands: tree, sort, alias, ps, history, calc, help");
    println!("Type \"help\" for more information");
    println!("Type \"exit\" to quit");

    if let Err(error) = interpreter.repl() {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}
