use loadstream::error::AppResult;

fn main() -> AppResult<()> {
    loadstream::entry::run()
}
