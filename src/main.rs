fn main() -> Result<(), Box<dyn std::error::Error>> {
    quantoptik::cli::main()
}
