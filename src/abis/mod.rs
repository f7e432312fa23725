use ethers::prelude::abigen;

abigen!(
    TokenFactory,
    r#"[
        function createToken(string name, string symbol, address initialOwner) external returns (address)
        event TokenCreated(address indexed tokenAddress, address indexed owner)
    ]"#,
);

abigen!(
    FactoryToken,
    r#"[
        function name() external view returns (string)
        function symbol() external view returns (string)
        function decimals() external view returns (uint8)
        function totalSupply() external view returns (uint256)
        function balanceOf(address account) external view returns (uint256)
        function allowance(address owner, address spender) external view returns (uint256)
        function transfer(address to, uint256 amount) external returns (bool)
        function approve(address spender, uint256 amount) external returns (bool)
        function transferFrom(address from, address to, uint256 amount) external returns (bool)
        function mint(address to, uint256 amount) external
        function burn(uint256 amount) external
    ]"#,
);
